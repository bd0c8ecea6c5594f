#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Brokerage clients: a single [`BrokerClient`] shape shared by both KR
//! and US venues, sitting on a pluggable [`VenueTransport`] wire boundary.

mod client;
mod error;
mod transport;
mod types;

pub use client::BrokerClient;
pub use error::BrokerError;
pub use transport::VenueTransport;
pub use types::{
    AccountSummary, BrokerHolding, FailureReason, OrderOutcome, OrderResult, Quote, Side,
    SkipReason,
};

#[cfg(any(test, feature = "mock"))]
pub use transport::mock::MockVenueTransport;
