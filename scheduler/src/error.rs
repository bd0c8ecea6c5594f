use prism_core::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open scheduled-order database: {0}")]
    Connection(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("database query failed: {0}")]
    Query(String),
    #[error("row {0} is malformed: {1}")]
    Corrupt(i32, String),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::StorageError
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}
