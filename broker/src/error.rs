use prism_core::{Classify, ErrorKind};

/// Errors surfaced by a [`crate::VenueTransport`] — genuinely exceptional
/// conditions at the wire boundary, as opposed to the everyday "skipped"
/// outcomes modeled by [`crate::OrderResult`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    #[error("connection to venue failed: {0}")]
    ConnectionFailed(String),
    #[error("price unavailable for {ticker}: {reason}")]
    PriceUnavailable { ticker: String, reason: String },
    #[error("broker rejected order for {ticker}: {reason}")]
    Rejected { ticker: String, reason: String },
}

impl Classify for BrokerError {
    fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::ConnectionFailed(_) => ErrorKind::BrokerRejected,
            BrokerError::PriceUnavailable { .. } => ErrorKind::PriceUnavailable,
            BrokerError::Rejected { .. } => ErrorKind::BrokerRejected,
        }
    }
}
