use crate::color::Color;
use crate::error::NotifierError;
use async_trait::async_trait;

/// One outbound notification channel. Implementations must be thread-safe
/// (`Send + Sync`) since [`crate::manager::NotifierManager`] fans a single
/// event out to every registered sink concurrently.
///
/// A sink returning `Err` only logs inside the manager; it never affects
/// delivery to any other sink, and is never retried.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send a short, structured message. `title` is a one-line summary,
    /// `message` the body, `color` a hint some sinks render visually.
    async fn send(&self, title: &str, message: &str, color: Color) -> Result<(), NotifierError>;

    /// Name used in logs when this sink's delivery fails.
    fn name(&self) -> &'static str;
}

/// Sink that discards every notification. Useful for dry-run mode or when
/// no webhooks are configured.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn send(&self, _title: &str, _message: &str, _color: Color) -> Result<(), NotifierError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Sink that emits notifications via `tracing` instead of a webhook. Used as
/// a fallback when a webhook is unreachable and as the only sink in
/// environments with no configured chat integration.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, title: &str, message: &str, color: Color) -> Result<(), NotifierError> {
        tracing::info!(title, message, color = ?color, "notification");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
