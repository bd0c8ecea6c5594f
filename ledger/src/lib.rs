#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Position and trade ledger: the bot's durable record of what
//! it believes it holds, every round-trip it has closed, and an
//! append-only log of every order attempt, success or failure.

mod error;
mod models;
mod schema;
mod store;

pub use error::LedgerError;
pub use models::{Position, TradeHistoryEntry, TradeLogEntry};
pub use store::{Ledger, DEFAULT_POSITION_LIMIT, DEFAULT_SECTOR_LIMIT, DEFAULT_SECTOR_RATIO};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use prism_broker::Side;
    use prism_core::Market;
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger {
        Ledger::connect(":memory:").expect("in-memory ledger should open and migrate")
    }

    #[tokio::test]
    async fn buy_then_sell_round_trip_computes_profit_and_clears_position() {
        let ledger = ledger();
        let buy_date = Utc::now() - Duration::days(10);
        let inserted = ledger
            .record_buy(Market::Kr, "005930", dec!(68_000), buy_date, None, None)
            .await
            .unwrap();
        assert!(inserted);

        let entry = ledger
            .record_sell(Market::Kr, "005930", dec!(72_000), Utc::now())
            .await
            .unwrap()
            .expect("position should have been present");

        assert_eq!(entry.holding_days, 10);
        assert!(entry.profit_rate > dec!(0.05) && entry.profit_rate < dec!(0.06));
        assert!(ledger.position(Market::Kr, "005930").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_buy_on_an_already_held_ticker_is_a_no_op() {
        let ledger = ledger();
        let now = Utc::now();
        assert!(ledger.record_buy(Market::Kr, "005930", dec!(68_000), now, None, None).await.unwrap());
        assert!(!ledger.record_buy(Market::Kr, "005930", dec!(69_000), now, None, None).await.unwrap());

        let position = ledger.position(Market::Kr, "005930").await.unwrap().unwrap();
        assert_eq!(position.buy_price, dec!(68_000));
    }

    #[tokio::test]
    async fn sell_on_unheld_ticker_is_a_ledger_no_op() {
        let ledger = ledger();
        let result = ledger.record_sell(Market::Kr, "005930", dec!(72_000), Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn admission_refuses_buy_past_the_position_limit() {
        let ledger = Ledger::connect_with_limits(":memory:", 2, 10, 1.0).unwrap();
        let now = Utc::now();
        ledger.record_buy(Market::Kr, "005930", dec!(1), now, None, None).await.unwrap();
        ledger.record_buy(Market::Kr, "000660", dec!(1), now, None, None).await.unwrap();

        let err = ledger.check_admission("035420", None).await.unwrap_err();
        assert!(matches!(err, LedgerError::PositionLimitExceeded { held: 2, limit: 2 }));
    }

    #[tokio::test]
    async fn admission_allows_a_buy_on_a_ticker_already_held() {
        let ledger = Ledger::connect_with_limits(":memory:", 1, 10, 1.0).unwrap();
        let now = Utc::now();
        ledger.record_buy(Market::Kr, "005930", dec!(1), now, None, None).await.unwrap();
        ledger.check_admission("005930", None).await.unwrap();
    }

    #[tokio::test]
    async fn admission_refuses_a_third_position_in_a_concentrated_sector() {
        let ledger = Ledger::connect_with_limits(":memory:", 10, 2, 0.40).unwrap();
        let now = Utc::now();
        ledger
            .record_buy(Market::Kr, "005930", dec!(1), now, Some("semiconductors".to_string()), None)
            .await
            .unwrap();
        ledger
            .record_buy(Market::Kr, "000660", dec!(1), now, Some("semiconductors".to_string()), None)
            .await
            .unwrap();

        let err = ledger
            .check_admission("042700", Some("semiconductors"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SectorConcentration { would_hold: 3, .. }));
    }

    #[tokio::test]
    async fn trade_log_is_appended_for_both_success_and_failure() {
        let ledger = ledger();
        ledger
            .append_trade_log(TradeLogEntry {
                ticker: "005930".into(),
                market: Market::Kr,
                action: Side::Buy,
                quantity: 10,
                price: Some(dec!(70_000)),
                total_amount: Some(dec!(700_000)),
                timestamp: Utc::now(),
                order_no: Some("ORD-1".to_string()),
                success: true,
                message: "Executed".to_string(),
            })
            .await
            .unwrap();

        ledger
            .append_trade_log(TradeLogEntry {
                ticker: "005930".into(),
                market: Market::Kr,
                action: Side::Sell,
                quantity: 0,
                price: None,
                total_amount: None,
                timestamp: Utc::now(),
                order_no: None,
                success: false,
                message: "timeout".to_string(),
            })
            .await
            .unwrap();
    }
}
