use crate::color::Color;
use crate::error::NotifierError;
use crate::sink::NotificationSink;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Posts to a Discord incoming webhook as a single embed, with `color`
/// mapped to the embed's decimal RGB field.
#[derive(Debug)]
pub struct DiscordSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest client"),
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn send(&self, title: &str, message: &str, color: Color) -> Result<(), NotifierError> {
        let payload = json!({
            "embeds": [{
                "title": if title.is_empty() { "Notification" } else { title },
                "description": message,
                "color": color.discord_rgb(),
            }]
        });
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        // Discord's webhook endpoint replies 204 by default, 200 when
        // `?wait=true` is appended to the URL.
        if !(resp.status().is_success()) {
            return Err(NotifierError::Status(resp.status()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
