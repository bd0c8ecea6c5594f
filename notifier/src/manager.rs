use crate::color::Color;
use crate::discord::DiscordSink;
use crate::sink::NotificationSink;
use crate::slack::SlackSink;

/// Fans a notification out to every registered sink. Sinks run
/// concurrently and independently: one's failure is logged and has no
/// effect on the others, and nothing is retried.
#[derive(Default)]
pub struct NotifierManager {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl std::fmt::Debug for NotifierManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierManager")
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl NotifierManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager from optional webhook URLs: an absent URL means
    /// that sink is simply not registered, not that it's registered and
    /// failing.
    pub fn from_webhooks(slack_webhook: Option<String>, discord_webhook: Option<String>) -> Self {
        let mut manager = Self::new();
        if let Some(url) = slack_webhook {
            manager.register(Box::new(SlackSink::new(url)));
        }
        if let Some(url) = discord_webhook {
            manager.register(Box::new(DiscordSink::new(url)));
        }
        manager
    }

    pub fn register(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Sends `message` under `title` with `color` to every registered sink
    /// concurrently. Defaults `title` to `"PRISM INSIGHT"` and `color` to
    /// blue.
    pub async fn send(&self, message: &str, title: Option<&str>, color: Option<Color>) {
        let title = title.unwrap_or("PRISM INSIGHT");
        let color = color.unwrap_or_default();

        let attempts = self.sinks.iter().map(|sink| async move {
            if let Err(err) = sink.send(title, message, color).await {
                tracing::warn!(sink = sink.name(), error = %err, "notification delivery failed");
            }
        });
        futures::future::join_all(attempts).await;
    }
}
