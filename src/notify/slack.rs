//! Slack incoming-webhook notifier.
//!
//! The payload is a single attachment colored by severity, holding Block Kit
//! blocks: title header, summary, the orphan list (or a note that there is
//! none) and a footer with the run time.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

use super::{Notification, Notifier, NotifyError};
use crate::config::NotifierConfig;

/// Characters of joined detail text kept before truncating.
pub const DETAILS_LIMIT: usize = 2900;

/// Appended to truncated detail text.
pub const TRUNCATION_MARKER: &str = "\n... (list truncated)";

/// Posts notifications to a Slack incoming webhook.
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(client: Client, webhook_url: Option<String>) -> Self {
        Self {
            client,
            webhook_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(client: Client, config: &NotifierConfig) -> Self {
        Self::new(client, config.webhook_url.clone()).with_timeout(config.timeout())
    }

    async fn deliver(&self, url: &str, payload: &Value) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    #[instrument(skip_all, fields(severity = ?notification.severity, details = notification.details.len()))]
    async fn notify(&self, notification: &Notification) {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::warn!("Webhook URL not configured, skipping notification");
            return;
        };

        let payload = build_payload(notification);
        match self.deliver(url, &payload).await {
            Ok(()) => tracing::debug!("Notification delivered"),
            Err(e) => tracing::error!(error = %e, "Failed to deliver notification"),
        }
    }
}

/// Render a notification as a Slack attachment payload.
pub fn build_payload(notification: &Notification) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("🌐 | Function | {}", notification.title),
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": format!(":inform: {}", notification.summary)}
        }),
    ];

    if notification.details.is_empty() {
        blocks.push(json!({
            "type": "context",
            "elements": [{"type": "mrkdwn", "text": "_No orphaned backups found in this run._"}]
        }));
    } else {
        blocks.push(json!({"type": "divider"}));
        blocks.push(json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": ":pushpin: *Orphaned Backups Found:*"}
        }));
        blocks.push(json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": truncate_details(&notification.details)}
        }));
    }

    blocks.push(json!({"type": "divider"}));
    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "⏱️ Execution time: {:.2}s | Region: {}",
                notification.duration.as_secs_f64(),
                notification.region
            )
        }]
    }));

    json!({
        "attachments": [{
            "color": notification.severity.color(),
            "blocks": blocks
        }]
    })
}

/// Join detail lines, keeping at most [`DETAILS_LIMIT`] characters.
///
/// Longer text is cut at the limit and [`TRUNCATION_MARKER`] appended.
pub fn truncate_details(details: &[String]) -> String {
    let joined = details.join("\n");
    match joined.char_indices().nth(DETAILS_LIMIT) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &joined[..cut]),
        None => joined,
    }
}
