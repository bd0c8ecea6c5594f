//! Market identity shared by every component that needs to know which venue,
//! calendar, currency, or broker client a signal or order belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two equity markets this execution core trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    /// Korean domestic equities (KRX), quoted in KRW.
    Kr,
    /// United States equities (NYSE/NASDAQ/AMEX), quoted in USD.
    Us,
}

impl Market {
    /// ISO 4217-ish currency code native to this market's brokerage account.
    pub fn currency(self) -> &'static str {
        match self {
            Market::Kr => "KRW",
            Market::Us => "USD",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Kr => write!(f, "KR"),
            Market::Us => write!(f, "US"),
        }
    }
}

impl Default for Market {
    /// Missing `market` on an inbound signal defaults to KR.
    fn default() -> Self {
        Market::Kr
    }
}

impl std::str::FromStr for Market {
    type Err = UnknownMarket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KR" => Ok(Market::Kr),
            "US" => Ok(Market::Us),
            other => Err(UnknownMarket(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown market: {0}")]
pub struct UnknownMarket(pub String);
