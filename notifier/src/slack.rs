use crate::color::Color;
use crate::error::NotifierError;
use crate::sink::NotificationSink;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Posts to a Slack incoming webhook. Slack's payload is plain text, so
/// `color` is accepted but unused — Slack has no equivalent of Discord's
/// embed color.
#[derive(Debug)]
pub struct SlackSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackSink {
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
impl NotificationSink for SlackSink {
    async fn send(&self, title: &str, message: &str, _color: Color) -> Result<(), NotifierError> {
        let text = if title.is_empty() {
            message.to_string()
        } else {
            format!("*{title}*\n{message}")
        };
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(NotifierError::Status(resp.status()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
