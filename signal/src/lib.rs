#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Signal schema and validator.
//!
//! Parses a JSON payload off the signal bus into a [`Signal`], enforcing that
//! the ticker is upper-cased and shape-checked per market, `signal_type` must
//! be one of BUY/SELL/EVENT, `market` defaults to
//! KR, `price` (when present) must be finite and non-negative, and
//! `timestamp` defaults to the receiver's wall clock. Parsing never
//! partially constructs a `Signal` — any violation returns [`SchemaError`]
//! and nothing else.

use chrono::{DateTime, Utc};
use prism_core::{Classify, ErrorKind, Market};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// The intent carried by a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    Buy,
    Sell,
    /// Observational only — never routed to the execution coordinator.
    Event,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Sell => write!(f, "SELL"),
            SignalType::Event => write!(f, "EVENT"),
        }
    }
}

impl std::str::FromStr for SignalType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(SignalType::Buy),
            "SELL" => Ok(SignalType::Sell),
            "EVENT" => Ok(SignalType::Event),
            other => Err(SchemaError::UnknownSignalType(other.to_string())),
        }
    }
}

/// A validated, in-flight trade signal. Not persisted by this core directly
/// — see `prism-scheduler::ScheduledOrder` for the persisted counterpart
/// used when execution must be deferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub ticker: SmolStr,
    pub company_name: Option<String>,
    pub signal_type: SignalType,
    pub price: Option<Decimal>,
    pub market: Market,
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
}

/// Wire representation before validation. Every field is optional/raw so
/// that a malformed payload fails in [`Signal::try_from`] with a specific
/// [`SchemaError`] rather than a generic deserialization error.
#[derive(Debug, Deserialize)]
struct RawSignal {
    ticker: Option<String>,
    company_name: Option<String>,
    signal_type: Option<String>,
    price: Option<Decimal>,
    market: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    source: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("missing required field: ticker")]
    MissingTicker,
    #[error("ticker {0:?} does not match the expected shape for market {1}")]
    InvalidTicker(String, Market),
    #[error("missing required field: signal_type")]
    MissingSignalType,
    #[error("unknown signal_type: {0:?}")]
    UnknownSignalType(String),
    #[error("unknown market: {0:?}")]
    UnknownMarket(String),
    #[error("price must be finite and non-negative, got {0}")]
    InvalidPrice(Decimal),
}

impl Classify for SchemaError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::SchemaError
    }
}

impl Signal {
    /// Parses and validates a JSON payload from the signal bus. Unknown
    /// fields are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Signal, SchemaError> {
        let raw: RawSignal =
            serde_json::from_slice(bytes).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        Signal::try_from(raw)
    }

    /// Normalizes `ticker` to upper case and validates it against the
    /// per-market shape (KR: six-digit numeric string; US: 1-5 Latin
    /// letters).
    fn validate_ticker(ticker: &str, market: Market) -> Result<SmolStr, SchemaError> {
        let upper = ticker.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(SchemaError::MissingTicker);
        }

        let shape_ok = match market {
            Market::Kr => upper.len() == 6 && upper.chars().all(|c| c.is_ascii_digit()),
            Market::Us => {
                (1..=5).contains(&upper.len()) && upper.chars().all(|c| c.is_ascii_alphabetic())
            }
        };

        if !shape_ok {
            return Err(SchemaError::InvalidTicker(upper, market));
        }

        Ok(SmolStr::new(upper))
    }
}

impl TryFrom<RawSignal> for Signal {
    type Error = SchemaError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        let market = match raw.market {
            Some(m) if !m.trim().is_empty() => m
                .parse::<Market>()
                .map_err(|_| SchemaError::UnknownMarket(m))?,
            _ => Market::default(),
        };

        let ticker_raw = raw.ticker.ok_or(SchemaError::MissingTicker)?;
        let ticker = Signal::validate_ticker(&ticker_raw, market)?;

        let signal_type_raw = raw.signal_type.ok_or(SchemaError::MissingSignalType)?;
        let signal_type: SignalType = signal_type_raw.parse()?;

        if let Some(price) = raw.price {
            if price < Decimal::ZERO {
                return Err(SchemaError::InvalidPrice(price));
            }
        }

        let timestamp = raw.timestamp.unwrap_or_else(Utc::now);

        Ok(Signal {
            ticker,
            company_name: raw.company_name,
            signal_type,
            price: raw.price,
            market,
            timestamp,
            source: raw.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(json: &str) -> Result<Signal, SchemaError> {
        Signal::parse(json.as_bytes())
    }

    #[test]
    fn parses_full_us_buy_signal() {
        let signal = payload(
            r#"{"ticker":"aapl","company_name":"Apple Inc.","signal_type":"BUY",
                "price":185.42,"market":"US","timestamp":"2026-01-20T14:03:00Z",
                "source":"trigger_batch_morning"}"#,
        )
        .expect("valid signal");

        assert_eq!(signal.ticker.as_str(), "AAPL");
        assert_eq!(signal.market, Market::Us);
        assert_eq!(signal.signal_type, SignalType::Buy);
        assert_eq!(signal.price, Some(dec!(185.42)));
        assert_eq!(signal.company_name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn missing_market_defaults_to_kr() {
        let signal = payload(r#"{"ticker":"005930","signal_type":"BUY"}"#).unwrap();
        assert_eq!(signal.market, Market::Kr);
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let before = Utc::now();
        let signal = payload(r#"{"ticker":"005930","signal_type":"EVENT"}"#).unwrap();
        let after = Utc::now();
        assert!(signal.timestamp >= before && signal.timestamp <= after);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let signal = payload(
            r#"{"ticker":"005930","signal_type":"BUY","unexpected_field":"whatever"}"#,
        )
        .unwrap();
        assert_eq!(signal.ticker.as_str(), "005930");
    }

    #[test]
    fn rejects_unknown_signal_type() {
        let err = payload(r#"{"ticker":"005930","signal_type":"HOLD"}"#).unwrap_err();
        assert_eq!(err, SchemaError::UnknownSignalType("HOLD".to_string()));
    }

    #[test]
    fn rejects_negative_price() {
        let err = payload(r#"{"ticker":"005930","signal_type":"BUY","price":-1.0}"#).unwrap_err();
        assert_eq!(err, SchemaError::InvalidPrice(dec!(-1.0)));
    }

    #[test]
    fn rejects_kr_ticker_with_wrong_shape() {
        let err = payload(r#"{"ticker":"AAPL","signal_type":"BUY","market":"KR"}"#).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidTicker("AAPL".to_string(), Market::Kr)
        );
    }

    #[test]
    fn rejects_us_ticker_with_wrong_shape() {
        let err = payload(r#"{"ticker":"123456","signal_type":"BUY","market":"US"}"#).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidTicker("123456".to_string(), Market::Us)
        );
    }

    #[test]
    fn rejects_missing_ticker() {
        let err = payload(r#"{"signal_type":"BUY"}"#).unwrap_err();
        assert_eq!(err, SchemaError::MissingTicker);
    }

    #[test]
    fn ticker_is_normalized_to_upper_case() {
        let signal = payload(r#"{"ticker":"aapl","signal_type":"EVENT","market":"US"}"#).unwrap();
        assert_eq!(signal.ticker.as_str(), "AAPL");
    }

    #[test]
    fn parse_then_reserialize_round_trips_required_fields() {
        let original = payload(
            r#"{"ticker":"005930","signal_type":"SELL","market":"KR","price":70000}"#,
        )
        .unwrap();
        let json = serde_json::to_string(&original).unwrap();
        let reparsed: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(original, reparsed);
    }
}
