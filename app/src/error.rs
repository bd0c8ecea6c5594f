use prism_core::config::ConfigError;
use prism_core::{Classify, ErrorKind};

/// Every way the binary can fail to start or wire its components. Each
/// component crate keeps its own narrower error type; this is the one place
/// they are unified so `main` has a single `Result` to match on for an exit
/// code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("ledger store error: {0}")]
    Ledger(#[from] prism_ledger::LedgerError),
    #[error("scheduled-order store error: {0}")]
    Scheduler(#[from] prism_scheduler::StoreError),
    #[error("no market is configured for trading")]
    NoMarketsConfigured,
    #[error("invalid dispatcher mode: {0}")]
    InvalidMode(#[from] prism_dispatcher::UnknownMode),
}

impl Classify for AppError {
    fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(err) => err.kind(),
            AppError::Ledger(err) => err.kind(),
            AppError::Scheduler(err) => err.kind(),
            AppError::NoMarketsConfigured => ErrorKind::StorageError,
            AppError::InvalidMode(_) => ErrorKind::SchemaError,
        }
    }
}
