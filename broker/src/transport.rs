//! The low-level wire boundary a [`crate::BrokerClient`] sits on top of.
//!
//! Authentication and wire framing are assumed supplied externally: this
//! trait is the seam a concrete discount-brokerage SDK implements.
//! `BrokerClient` only ever calls through this trait, never a concrete
//! HTTP/FFI client directly.

use crate::error::BrokerError;
use crate::types::{BrokerHolding, Quote, Side};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait VenueTransport: Send + Sync {
    /// Last-price snapshot for `ticker`.
    async fn quote(&self, ticker: &str) -> Result<Quote, BrokerError>;

    /// Submits a market order, returning the venue's order number and fill
    /// price. `quantity` has already been computed by the caller.
    async fn submit_market_order(
        &self,
        ticker: &str,
        side: Side,
        quantity: u64,
    ) -> Result<(String, Decimal), BrokerError>;

    /// Submits a limit order at `price`.
    async fn submit_limit_order(
        &self,
        ticker: &str,
        side: Side,
        quantity: u64,
        price: Decimal,
    ) -> Result<(String, Decimal), BrokerError>;

    /// Snapshot of broker-side positions in the client's native currency.
    async fn holdings(&self) -> Result<Vec<BrokerHolding>, BrokerError>;

    /// Available cash balance, used to derive [`crate::AccountSummary`].
    async fn cash_balance(&self) -> Result<Decimal, BrokerError>;
}

/// In-memory transport used by tests and by `dry-run` wiring in `app`. Never
/// used for real trading.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::types::BrokerHolding;
    use parking_lot::Mutex;
    use smol_str::SmolStr;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MockVenueTransport {
        pub prices: Mutex<HashMap<String, Decimal>>,
        pub holdings: Mutex<HashMap<String, BrokerHolding>>,
        pub cash: Mutex<Decimal>,
        pub next_order_no: Mutex<u64>,
        pub fail_quote_for: Mutex<Option<String>>,
        pub reject_orders: Mutex<bool>,
    }

    impl MockVenueTransport {
        pub fn new() -> Self {
            Self {
                cash: Mutex::new(Decimal::ZERO),
                ..Default::default()
            }
        }

        pub fn with_price(self, ticker: &str, price: Decimal) -> Self {
            self.prices.lock().insert(ticker.to_string(), price);
            self
        }

        pub fn with_cash(self, cash: Decimal) -> Self {
            *self.cash.lock() = cash;
            self
        }

        pub fn with_holding(self, holding: BrokerHolding) -> Self {
            self.holdings
                .lock()
                .insert(holding.ticker.to_string(), holding);
            self
        }
    }

    #[async_trait]
    impl VenueTransport for MockVenueTransport {
        async fn quote(&self, ticker: &str) -> Result<Quote, BrokerError> {
            if self.fail_quote_for.lock().as_deref() == Some(ticker) {
                return Err(BrokerError::PriceUnavailable {
                    ticker: ticker.to_string(),
                    reason: "venue returned no row".to_string(),
                });
            }
            let price = self
                .prices
                .lock()
                .get(ticker)
                .copied()
                .ok_or_else(|| BrokerError::PriceUnavailable {
                    ticker: ticker.to_string(),
                    reason: "no quote configured".to_string(),
                })?;
            Ok(Quote {
                ticker: SmolStr::new(ticker),
                last_price: price,
                change_pct: Decimal::ZERO,
                volume: 0,
                venue: "MOCK".to_string(),
            })
        }

        async fn submit_market_order(
            &self,
            ticker: &str,
            _side: Side,
            _quantity: u64,
        ) -> Result<(String, Decimal), BrokerError> {
            if *self.reject_orders.lock() {
                return Err(BrokerError::Rejected {
                    ticker: ticker.to_string(),
                    reason: "simulated rejection".to_string(),
                });
            }
            let price = self.quote(ticker).await?.last_price;
            let mut seq = self.next_order_no.lock();
            *seq += 1;
            Ok((format!("MOCK-{seq}"), price))
        }

        async fn submit_limit_order(
            &self,
            ticker: &str,
            _side: Side,
            _quantity: u64,
            price: Decimal,
        ) -> Result<(String, Decimal), BrokerError> {
            if *self.reject_orders.lock() {
                return Err(BrokerError::Rejected {
                    ticker: ticker.to_string(),
                    reason: "simulated rejection".to_string(),
                });
            }
            let mut seq = self.next_order_no.lock();
            *seq += 1;
            Ok((format!("MOCK-{seq}"), price))
        }

        async fn holdings(&self) -> Result<Vec<BrokerHolding>, BrokerError> {
            Ok(self.holdings.lock().values().cloned().collect())
        }

        async fn cash_balance(&self) -> Result<Decimal, BrokerError> {
            Ok(*self.cash.lock())
        }
    }
}
