//! Run summaries and their delivery to a chat webhook.

mod slack;

use std::time::Duration;

use async_trait::async_trait;
pub use slack::{DETAILS_LIMIT, SlackNotifier, TRUNCATION_MARKER, build_payload, truncate_details};

/// How a run turned out, as far as the reader of the notification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Orphans found.
    Attention,
    /// Nothing to act on.
    Success,
    /// The run could not scan.
    Critical,
}

impl Severity {
    /// Attachment side-bar color.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Attention => "#ff9900",
            Self::Success => "#36a64f",
            Self::Critical => "#ff0000",
        }
    }
}

/// One run summary, rendered by a [`Notifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub summary: String,
    /// Orphan detail lines in scan order; empty when there is nothing to list.
    pub details: Vec<String>,
    pub severity: Severity,
    pub duration: Duration,
    /// Display name of the first configured region.
    pub region: String,
}

/// Delivers run summaries.
///
/// Delivery is best-effort: implementations log failures and never fail
/// the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Webhook delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },
}
