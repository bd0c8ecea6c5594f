use prism_core::{Classify, ErrorKind};

/// Errors the coordinator itself raises — distinct from the everyday
/// skip/fail vocabulary `prism_broker::OrderResult` already carries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    #[error("no broker wired for market {0}")]
    NoBrokerForMarket(prism_core::Market),
    #[error("coordinator is shutting down")]
    ShuttingDown,
}

impl Classify for ExecutionError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::NoBrokerForMarket(_) => ErrorKind::BrokerRejected,
            ExecutionError::ShuttingDown => ErrorKind::ShutdownRequested,
        }
    }
}
