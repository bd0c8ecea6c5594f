/// Failure from a single sink's delivery attempt. Never surfaced past
/// [`crate::manager::NotifierManager`]: callers only ever see a fan-out
/// completion, never an error — notification loss is tolerable.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(reqwest::StatusCode),
}
