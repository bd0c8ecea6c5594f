#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Scheduled-order store and market-hours replay loop: a durable
//! SQLite-backed queue of signals that arrived while their market was
//! closed, replayed once it reopens.

mod error;
mod models;
mod replay;
mod schema;
mod store;

pub use error::StoreError;
pub use models::{OrderStatus, ScheduledOrder};
pub use replay::{ReplayLoop, DEFAULT_POLL_INTERVAL};
pub use store::{reconstruct_signal, ScheduledOrderStore};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use prism_broker::{BrokerClient, MockVenueTransport};
    use prism_calendar::MarketCalendar;
    use prism_core::Market;
    use prism_execution::Coordinator;
    use prism_signal::{Signal, SignalType};
    use rust_decimal_macros::dec;
    use smol_str::SmolStr;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn signal(ticker: &str, signal_type: SignalType, market: Market) -> Signal {
        Signal {
            ticker: SmolStr::new(ticker),
            company_name: None,
            signal_type,
            price: None,
            market,
            timestamp: Utc::now(),
            source: None,
        }
    }

    fn memory_store() -> ScheduledOrderStore {
        ScheduledOrderStore::connect(":memory:").expect("in-memory store should open and migrate")
    }

    #[tokio::test]
    async fn enqueue_then_pending_count_reflects_one_row() {
        let store = memory_store();
        let sig = signal("AAPL", SignalType::Buy, Market::Us);
        store.enqueue(&sig, Utc::now() + ChronoDuration::hours(1)).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn take_ready_only_returns_rows_whose_execute_after_has_elapsed() {
        let store = memory_store();
        let past = signal("AAPL", SignalType::Buy, Market::Us);
        let future = signal("MSFT", SignalType::Buy, Market::Us);
        store.enqueue(&past, Utc::now() - ChronoDuration::minutes(1)).await.unwrap();
        store.enqueue(&future, Utc::now() + ChronoDuration::hours(1)).await.unwrap();

        let ready = store.take_ready(Utc::now()).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].ticker.as_str(), "AAPL");
    }

    #[tokio::test]
    async fn mark_executed_is_idempotent() {
        let store = memory_store();
        let sig = signal("AAPL", SignalType::Buy, Market::Us);
        let id = store.enqueue(&sig, Utc::now() - ChronoDuration::minutes(1)).await.unwrap();

        store.mark_executed(id).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 0);

        // A second call must not revive or error on an already-terminal row.
        store.mark_executed(id).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_failed_does_not_rewrite_an_already_executed_row() {
        let store = memory_store();
        let sig = signal("AAPL", SignalType::Buy, Market::Us);
        let id = store.enqueue(&sig, Utc::now() - ChronoDuration::minutes(1)).await.unwrap();

        store.mark_executed(id).await.unwrap();
        store.mark_failed(id, "should be ignored".to_string()).await.unwrap();

        let ready = store.take_ready(Utc::now() + ChronoDuration::days(1)).await.unwrap();
        assert!(ready.is_empty());
    }

    #[tokio::test]
    async fn replay_loop_executes_a_ready_row_against_the_coordinator() {
        use chrono::TimeZone;

        let store = memory_store();
        // 2026-01-20 is a Tuesday; 15:00 UTC is 10:00 US/Eastern, inside
        // the regular session with no holiday in play.
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 15, 0, 0).unwrap();
        let mut sig = signal("AAPL", SignalType::Buy, Market::Us);
        sig.timestamp = now;
        store.enqueue(&sig, now - ChronoDuration::minutes(1)).await.unwrap();

        let transport = MockVenueTransport::new().with_price("AAPL", dec!(150));
        let broker = BrokerClient::new(Market::Us, Arc::new(transport), dec!(10_000), true);
        let mut brokers = HashMap::new();
        brokers.insert(Market::Us, broker);
        let calendar = Arc::new(MarketCalendar::new(Vec::new()));
        let coordinator = Arc::new(Coordinator::new(brokers, calendar.clone()));

        let loop_ = ReplayLoop::new(store.clone(), coordinator, calendar);
        loop_.run_one_iteration(now).await;

        assert_eq!(store.pending_count().await.unwrap(), 0);
    }
}
