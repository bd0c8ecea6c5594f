use crate::error::BrokerError;
use crate::transport::VenueTransport;
use crate::types::{
    AccountSummary, BrokerHolding, FailureReason, OrderResult, Quote, Side, SkipReason,
};
use prism_calendar::MarketCalendar;
use prism_core::Market;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::{info, warn};

/// The bot's single brokerage surface, parameterized by which [`Market`] and
/// [`VenueTransport`] it is wired to. KR and US are the same struct rather
/// than separate types — the whole-position rules and skip/fail vocabulary
/// are identical, only the wire transport and session hours differ.
#[derive(Clone)]
pub struct BrokerClient {
    market: Market,
    transport: Arc<dyn VenueTransport>,
    /// Fixed KRW/USD amount committed to every buy — every buy spends the
    /// full configured budget.
    per_order_budget: Decimal,
    auto_trading: bool,
}

impl std::fmt::Debug for BrokerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerClient")
            .field("market", &self.market)
            .field("per_order_budget", &self.per_order_budget)
            .field("auto_trading", &self.auto_trading)
            .finish_non_exhaustive()
    }
}

impl BrokerClient {
    pub fn new(
        market: Market,
        transport: Arc<dyn VenueTransport>,
        per_order_budget: Decimal,
        auto_trading: bool,
    ) -> Self {
        Self {
            market,
            transport,
            per_order_budget,
            auto_trading,
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub async fn current_price(&self, ticker: &str) -> Result<Quote, BrokerError> {
        self.transport.quote(ticker).await
    }

    /// Whole shares purchasable with `per_order_budget` at `price`. Never
    /// negative; zero means the budget cannot afford even one share.
    pub fn buy_quantity(&self, price: Decimal) -> u64 {
        if price <= Decimal::ZERO {
            return 0;
        }
        (self.per_order_budget / price).trunc().to_u64().unwrap_or(0)
    }

    /// Spends the full `per_order_budget` on `ticker` at the current market
    /// price. Always terminal: never returns an `Err`, every failure mode is
    /// folded into [`OrderResult`] as an explicit value instead.
    pub async fn buy_market(&self, ticker: &str) -> OrderResult {
        let ticker = SmolStr::new(ticker);
        if !self.auto_trading {
            return OrderResult::skipped(ticker, Side::Buy, SkipReason::AutoTradingDisabled);
        }

        let quote = match self.transport.quote(&ticker).await {
            Ok(q) => q,
            Err(_) => {
                return OrderResult::failed(ticker, Side::Buy, FailureReason::PriceUnavailable)
            }
        };

        let quantity = self.buy_quantity(quote.last_price);
        if quantity == 0 {
            return OrderResult::skipped(ticker, Side::Buy, SkipReason::InsufficientBudget);
        }

        match self
            .transport
            .submit_market_order(&ticker, Side::Buy, quantity)
            .await
        {
            Ok((order_no, fill_price)) => {
                info!(%ticker, quantity, %fill_price, "buy order filled");
                OrderResult::filled(ticker, Side::Buy, order_no, quantity, fill_price)
            }
            Err(err) => {
                warn!(%ticker, %err, "buy order rejected");
                OrderResult::failed(ticker, Side::Buy, FailureReason::BrokerRejected(err.to_string()))
            }
        }
    }

    /// Spends the full `per_order_budget` on `ticker` at `limit_price`.
    pub async fn buy_limit(&self, ticker: &str, limit_price: Decimal) -> OrderResult {
        let ticker = SmolStr::new(ticker);
        if !self.auto_trading {
            return OrderResult::skipped(ticker, Side::Buy, SkipReason::AutoTradingDisabled);
        }

        let quantity = self.buy_quantity(limit_price);
        if quantity == 0 {
            return OrderResult::skipped(ticker, Side::Buy, SkipReason::InsufficientBudget);
        }

        match self
            .transport
            .submit_limit_order(&ticker, Side::Buy, quantity, limit_price)
            .await
        {
            Ok((order_no, fill_price)) => {
                OrderResult::filled(ticker, Side::Buy, order_no, quantity, fill_price)
            }
            Err(err) => {
                OrderResult::failed(ticker, Side::Buy, FailureReason::BrokerRejected(err.to_string()))
            }
        }
    }

    /// Liquidates the entire held position in `ticker`, whatever its size.
    /// Queries the venue's own holdings to determine quantity and no-ops if
    /// it is zero
    /// — the ledger is never consulted to short-circuit this call, only to
    /// decide afterward whether to record trade history.
    pub async fn sell_all_market(&self, ticker: &str) -> OrderResult {
        let ticker = SmolStr::new(ticker);
        if !self.auto_trading {
            return OrderResult::skipped(ticker, Side::Sell, SkipReason::AutoTradingDisabled);
        }

        let held_quantity = match self.transport.holdings().await {
            Ok(holdings) => holdings
                .iter()
                .find(|h| h.ticker == ticker)
                .map(|h| h.quantity)
                .unwrap_or(0),
            Err(_) => {
                return OrderResult::failed(ticker, Side::Sell, FailureReason::PriceUnavailable)
            }
        };
        if held_quantity == 0 {
            return OrderResult::skipped(ticker, Side::Sell, SkipReason::NoPosition);
        }

        match self
            .transport
            .submit_market_order(&ticker, Side::Sell, held_quantity)
            .await
        {
            Ok((order_no, fill_price)) => {
                info!(%ticker, quantity = held_quantity, %fill_price, "sell order filled");
                OrderResult::filled(ticker, Side::Sell, order_no, held_quantity, fill_price)
            }
            Err(err) => {
                warn!(%ticker, %err, "sell order rejected");
                OrderResult::failed(ticker, Side::Sell, FailureReason::BrokerRejected(err.to_string()))
            }
        }
    }

    pub async fn holdings(&self) -> Result<Vec<BrokerHolding>, BrokerError> {
        self.transport.holdings().await
    }

    pub async fn account_summary(&self) -> Result<AccountSummary, BrokerError> {
        let cash = self.transport.cash_balance().await?;
        let holdings = self.transport.holdings().await?;
        Ok(AccountSummary::from_holdings(cash, &holdings))
    }

    /// `buy_market`, gated on the venue actually being open. Orders
    /// submitted while a market is closed are
    /// indistinguishable from bugs upstream, so this is the entrypoint the
    /// execution coordinator calls rather than the bare `buy_market`.
    pub async fn smart_buy_market(
        &self,
        ticker: &str,
        calendar: &MarketCalendar,
        now: chrono::DateTime<chrono::Utc>,
    ) -> OrderResult {
        if !calendar.is_open(self.market, now) {
            return OrderResult::skipped(
                SmolStr::new(ticker),
                Side::Buy,
                SkipReason::MarketClosed,
            );
        }
        self.buy_market(ticker).await
    }

    /// `sell_all_market`, gated on the venue being open.
    pub async fn smart_sell_all(
        &self,
        ticker: &str,
        calendar: &MarketCalendar,
        now: chrono::DateTime<chrono::Utc>,
    ) -> OrderResult {
        if !calendar.is_open(self.market, now) {
            return OrderResult::skipped(
                SmolStr::new(ticker),
                Side::Sell,
                SkipReason::MarketClosed,
            );
        }
        self.sell_all_market(ticker).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockVenueTransport;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn kr_calendar() -> MarketCalendar {
        MarketCalendar::new(Vec::new())
    }

    fn client_with(transport: MockVenueTransport, budget: Decimal, auto_trading: bool) -> BrokerClient {
        BrokerClient::new(Market::Kr, Arc::new(transport), budget, auto_trading)
    }

    #[test]
    fn buy_quantity_floors_to_whole_shares() {
        let client = client_with(MockVenueTransport::new(), dec!(1_000_000), true);
        assert_eq!(client.buy_quantity(dec!(333_333)), 3);
    }

    #[test]
    fn buy_quantity_is_zero_when_budget_cannot_afford_one_share() {
        let client = client_with(MockVenueTransport::new(), dec!(100), true);
        assert_eq!(client.buy_quantity(dec!(500)), 0);
    }

    #[tokio::test]
    async fn buy_market_spends_whole_budget() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let client = client_with(transport, dec!(1_000_000), true);
        let result = client.buy_market("005930").await;
        assert!(result.success());
        assert_eq!(result.quantity, 14);
    }

    #[tokio::test]
    async fn buy_market_skips_when_budget_insufficient() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(10_000_000));
        let client = client_with(transport, dec!(1_000_000), true);
        let result = client.buy_market("005930").await;
        assert!(!result.success());
        assert_eq!(
            result.outcome,
            crate::types::OrderOutcome::Skipped(SkipReason::InsufficientBudget)
        );
    }

    #[tokio::test]
    async fn buy_market_skips_when_auto_trading_disabled() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let client = client_with(transport, dec!(1_000_000), false);
        let result = client.buy_market("005930").await;
        assert_eq!(
            result.outcome,
            crate::types::OrderOutcome::Skipped(SkipReason::AutoTradingDisabled)
        );
    }

    #[tokio::test]
    async fn sell_all_market_sells_entire_held_quantity() {
        let transport = MockVenueTransport::new()
            .with_price("005930", dec!(70_000))
            .with_holding(BrokerHolding {
                ticker: SmolStr::new("005930"),
                quantity: 42,
                avg_price: dec!(60_000),
                current_price: dec!(70_000),
            });
        let client = client_with(transport, dec!(1_000_000), true);
        let result = client.sell_all_market("005930").await;
        assert!(result.success());
        assert_eq!(result.quantity, 42);
    }

    #[tokio::test]
    async fn sell_all_market_skips_when_nothing_held() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let client = client_with(transport, dec!(1_000_000), true);
        let result = client.sell_all_market("005930").await;
        assert_eq!(
            result.outcome,
            crate::types::OrderOutcome::Skipped(SkipReason::NoPosition)
        );
    }

    #[tokio::test]
    async fn smart_buy_market_skips_when_market_closed() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        let client = client_with(transport, dec!(1_000_000), true);
        let calendar = kr_calendar();
        // A Sunday in KST.
        let now = Utc.with_ymd_and_hms(2026, 1, 18, 2, 0, 0).unwrap();
        let result = client.smart_buy_market("005930", &calendar, now).await;
        assert_eq!(
            result.outcome,
            crate::types::OrderOutcome::Skipped(SkipReason::MarketClosed)
        );
    }

    #[tokio::test]
    async fn buy_market_fails_when_order_rejected() {
        let transport = MockVenueTransport::new().with_price("005930", dec!(70_000));
        *transport.reject_orders.lock() = true;
        let client = client_with(transport, dec!(1_000_000), true);
        let result = client.buy_market("005930").await;
        assert!(!result.success());
        assert!(matches!(
            result.outcome,
            crate::types::OrderOutcome::Failed(FailureReason::BrokerRejected(_))
        ));
    }

    #[tokio::test]
    async fn account_summary_sums_holdings() {
        let transport = MockVenueTransport::new()
            .with_cash(dec!(500_000))
            .with_holding(BrokerHolding {
                ticker: SmolStr::new("005930"),
                quantity: 10,
                avg_price: dec!(60_000),
                current_price: dec!(70_000),
            });
        let client = client_with(transport, dec!(1_000_000), true);
        let summary = client.account_summary().await.unwrap();
        assert_eq!(summary.available_cash, dec!(500_000));
        assert_eq!(summary.total_market_value, dec!(700_000));
        assert_eq!(summary.total_unrealized_pnl, dec!(100_000));
    }
}
