use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Order side, independent of `prism-signal`'s `SignalType::Event` — the
/// broker layer only ever knows how to buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Last-price snapshot returned by a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: SmolStr,
    pub last_price: Decimal,
    pub change_pct: Decimal,
    pub volume: u64,
    /// Venue tag, e.g. `"KRX"`, `"NASDAQ"`, `"NYSE"`, `"AMEX"`.
    pub venue: String,
}

/// A broker-side holding, as returned by [`crate::VenueTransport::holdings`].
/// Distinct from `prism-ledger::Position`, which is the bot's *own* view of
/// what it believes it holds — the broker's view is authoritative on
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerHolding {
    pub ticker: SmolStr,
    pub quantity: u64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
}

impl BrokerHolding {
    pub fn market_value(&self) -> Decimal {
        self.current_price * Decimal::from(self.quantity)
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        (self.current_price - self.avg_price) * Decimal::from(self.quantity)
    }
}

/// Aggregate account snapshot, derived from holdings for its totals rather
/// than tracked independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub available_cash: Decimal,
    pub total_market_value: Decimal,
    pub total_unrealized_pnl: Decimal,
}

impl AccountSummary {
    pub fn from_holdings(available_cash: Decimal, holdings: &[BrokerHolding]) -> Self {
        let total_market_value = holdings.iter().map(BrokerHolding::market_value).sum();
        let total_unrealized_pnl = holdings.iter().map(BrokerHolding::unrealized_pnl).sum();
        Self {
            available_cash,
            total_market_value,
            total_unrealized_pnl,
        }
    }
}

/// Why an order attempt produced no fill, without it being an error —
/// insufficient budget and a closed market are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    MarketClosed,
    AutoTradingDisabled,
    InsufficientBudget,
    NoPosition,
    /// The ledger's position-slot or sector-concentration admission check
    /// refused this buy before a broker call was attempted.
    AdmissionRefused(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MarketClosed => f.write_str("market_closed"),
            SkipReason::AutoTradingDisabled => f.write_str("auto_trading_disabled"),
            SkipReason::InsufficientBudget => f.write_str("insufficient budget"),
            SkipReason::NoPosition => f.write_str("no_position"),
            SkipReason::AdmissionRefused(reason) => write!(f, "admission refused: {reason}"),
        }
    }
}

/// Why an order attempt failed outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    PriceUnavailable,
    BrokerRejected(String),
    Timeout,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::PriceUnavailable => write!(f, "price unavailable"),
            FailureReason::BrokerRejected(reason) => write!(f, "broker rejected: {reason}"),
            FailureReason::Timeout => write!(f, "timeout"),
        }
    }
}

/// The terminal outcome of an order attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Filled,
    Skipped(SkipReason),
    Failed(FailureReason),
}

/// Result of a single `buy_market` / `buy_limit` / `sell_all_market` /
/// `smart_*` call. Always terminal — coordinators and the scheduler never
/// retry based on this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub outcome: OrderOutcome,
    pub ticker: SmolStr,
    pub side: Side,
    pub order_no: Option<String>,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
}

impl OrderResult {
    pub fn filled(
        ticker: SmolStr,
        side: Side,
        order_no: String,
        quantity: u64,
        price: Decimal,
    ) -> Self {
        Self {
            outcome: OrderOutcome::Filled,
            ticker,
            side,
            order_no: Some(order_no),
            quantity,
            price: Some(price),
            total_amount: Some(price * Decimal::from(quantity)),
        }
    }

    pub fn skipped(ticker: SmolStr, side: Side, reason: SkipReason) -> Self {
        Self {
            outcome: OrderOutcome::Skipped(reason),
            ticker,
            side,
            order_no: None,
            quantity: 0,
            price: None,
            total_amount: None,
        }
    }

    pub fn failed(ticker: SmolStr, side: Side, reason: FailureReason) -> Self {
        Self {
            outcome: OrderOutcome::Failed(reason),
            ticker,
            side,
            order_no: None,
            quantity: 0,
            price: None,
            total_amount: None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, OrderOutcome::Filled)
    }

    /// One-line message suitable for the trade-execution log and the
    /// notifier.
    pub fn message(&self) -> String {
        match &self.outcome {
            OrderOutcome::Filled => "Executed".to_string(),
            OrderOutcome::Skipped(reason) => reason.to_string(),
            OrderOutcome::Failed(reason) => reason.to_string(),
        }
    }
}
