use prism_core::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to open ledger database: {0}")]
    Connection(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("database query failed: {0}")]
    Query(String),
    #[error("row is malformed: {0}")]
    Corrupt(String),
    #[error("buy refused: position set already holds {held}/{limit} positions")]
    PositionLimitExceeded { held: usize, limit: usize },
    #[error("buy refused: sector {sector:?} would hold {would_hold}/{limit} positions or exceed the {ratio:.0}% concentration ratio")]
    SectorConcentration {
        sector: String,
        would_hold: usize,
        limit: usize,
        ratio: f64,
    },
}

impl Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::PositionLimitExceeded { .. } | LedgerError::SectorConcentration { .. } => {
                ErrorKind::BrokerRejected
            }
            _ => ErrorKind::StorageError,
        }
    }
}

impl From<diesel::r2d2::PoolError> for LedgerError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        LedgerError::Connection(err.to_string())
    }
}

impl From<diesel::result::Error> for LedgerError {
    fn from(err: diesel::result::Error) -> Self {
        LedgerError::Query(err.to_string())
    }
}
