use prism_core::{Classify, ErrorKind};

/// Errors that occur before a signal could be routed anywhere. Anything
/// raised here means the bus message is nacked.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("payload failed validation: {0}")]
    Schema(#[from] prism_signal::SchemaError),
    #[error("execution coordinator rejected the submission: {0}")]
    Execution(#[from] prism_execution::ExecutionError),
    #[error("scheduled-order store failed: {0}")]
    Store(#[from] prism_scheduler::StoreError),
}

impl Classify for DispatchError {
    fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Schema(err) => err.kind(),
            DispatchError::Execution(err) => err.kind(),
            DispatchError::Store(err) => err.kind(),
        }
    }
}
