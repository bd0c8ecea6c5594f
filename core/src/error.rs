//! Error classification shared across every component.
//!
//! Each crate keeps its own concrete [`thiserror`] enum; this module defines
//! a flat classification of error *kinds* so that logs, [`crate::shutdown`],
//! and `OrderResult` reasons can be compared/matched without importing every
//! downstream crate's error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the error kinds named in the error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Signal payload failed validation; nack, do not ack.
    SchemaError,
    /// Smart-buy/sell attempted while the target market's calendar reports closed.
    MarketClosed,
    /// Broker price query returned no row / was rejected.
    PriceUnavailable,
    /// Non-2xx or structured error surfaced by a broker.
    BrokerRejected,
    /// Coordinator operation deadline exceeded.
    Timeout,
    /// Persistence layer failed to read or write.
    StorageError,
    /// Orderly shutdown requested by the OS.
    ShutdownRequested,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SchemaError => "schema_error",
            ErrorKind::MarketClosed => "market_closed",
            ErrorKind::PriceUnavailable => "price_unavailable",
            ErrorKind::BrokerRejected => "broker_rejected",
            ErrorKind::Timeout => "timeout",
            ErrorKind::StorageError => "storage_error",
            ErrorKind::ShutdownRequested => "shutdown_requested",
        };
        f.write_str(s)
    }
}

/// Implemented by every crate-local error enum so call sites can classify an
/// error without matching on its concrete variants.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
