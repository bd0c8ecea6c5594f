#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! Notifier fan-out: independent webhook sinks for
//! human-readable trade notifications. One sink's failure never affects
//! another, and nothing is retried — notification loss is tolerable.

mod color;
mod discord;
mod error;
mod manager;
mod sink;
mod slack;

pub use color::Color;
pub use discord::DiscordSink;
pub use error::NotifierError;
pub use manager::NotifierManager;
pub use sink::{LogSink, NotificationSink, NullSink};
pub use slack::SlackSink;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingSink {
        calls: Arc<AtomicUsize>,
        fails: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, _title: &str, _message: &str, _color: Color) -> Result<(), NotifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(NotifierError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn empty_manager_has_no_sinks_and_send_is_a_no_op() {
        let manager = NotifierManager::new();
        assert!(manager.is_empty());
        manager.send("hello", None, None).await;
    }

    #[tokio::test]
    async fn from_webhooks_registers_only_the_configured_sinks() {
        assert_eq!(NotifierManager::from_webhooks(None, None).len(), 0);
        assert_eq!(
            NotifierManager::from_webhooks(Some("https://hooks.example/a".into()), None).len(),
            1
        );
        assert_eq!(
            NotifierManager::from_webhooks(
                Some("https://hooks.example/a".into()),
                Some("https://discord.example/b".into())
            )
            .len(),
            2
        );
    }

    #[tokio::test]
    async fn one_sink_failing_does_not_stop_delivery_to_the_others() {
        let ok_calls = Arc::new(AtomicUsize::new(0));
        let failing_calls = Arc::new(AtomicUsize::new(0));

        let mut manager = NotifierManager::new();
        manager.register(Box::new(RecordingSink {
            calls: ok_calls.clone(),
            fails: false,
        }));
        manager.register(Box::new(RecordingSink {
            calls: failing_calls.clone(),
            fails: true,
        }));
        manager.register(Box::new(NullSink));

        manager.send("trade executed", Some("BUY 005930"), Some(Color::Green)).await;

        assert_eq!(ok_calls.load(Ordering::SeqCst), 1);
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn discord_color_mapping_matches_the_original_palette() {
        assert_eq!(Color::Green.discord_rgb(), 5_763_719);
        assert_eq!(Color::Red.discord_rgb(), 15_548_997);
        assert_eq!(Color::Blue.discord_rgb(), 3_447_003);
        assert_eq!(Color::Yellow.discord_rgb(), 16_776_960);
    }
}
