//! Chat webhook notification configuration.
//!
//! # Example
//!
//! ```toml
//! [notifier]
//! webhook_url = "${SLACK_WEBHOOK_URL}"
//! timeout_secs = 10
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Webhook notifier configuration.
///
/// When `webhook_url` is unset the notification step is skipped with a
/// warning; the scan itself still runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    /// Incoming webhook URL (Slack-compatible).
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Timeout for the outbound webhook request, in seconds.
    /// Default: 10
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Title shown in the message header.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
            title: default_title(),
        }
    }
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("notifier.timeout_secs must be greater than 0".into());
        }
        if let Some(url) = &self.webhook_url
            && url::Url::parse(url).is_err()
        {
            return Err(format!("notifier.webhook_url is not a valid URL: {url}"));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_title() -> String {
    "🔎 OCI Backup Orphan Finder".to_string()
}
