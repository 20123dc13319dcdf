//! One audit run: enumerate compartments, walk every region and compartment,
//! classify backups, notify.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::instrument;

use super::{
    backups::collect_backups,
    classifier::{format_orphan_line, is_orphan},
    compartments::{CompartmentFilter, list_compartments},
};
use crate::{
    config::{NotifierConfig, ScanConfig},
    notify::{Notification, Notifier, Severity},
    oci::{BlockStorageConnector, IdentityApi},
};

/// Summary text (and only report line) of a run that could not enumerate
/// compartments.
pub const CRITICAL_SUMMARY: &str = "Critical error: failed to list compartments.";

/// How a run ended, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Compartment enumeration failed; nothing was scanned.
    Critical,
    /// At least one orphan was found.
    Attention { orphans: usize },
    /// No backups were visible at all.
    NothingToAnalyze,
    /// Backups were found, none orphaned.
    Compliant { total: usize },
}

impl ScanOutcome {
    fn classify(orphans: usize, total: usize) -> Self {
        if orphans > 0 {
            Self::Attention { orphans }
        } else if total == 0 {
            Self::NothingToAnalyze
        } else {
            Self::Compliant { total }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Critical => Severity::Critical,
            Self::Attention { .. } => Severity::Attention,
            Self::NothingToAnalyze | Self::Compliant { .. } => Severity::Success,
        }
    }

    /// One-line summary shown at the top of the notification.
    pub fn summary(&self) -> String {
        match self {
            Self::Critical => CRITICAL_SUMMARY.to_string(),
            Self::Attention { orphans } => format!(
                "❌ *ATTENTION:* Found *{orphans}* orphaned VM backups. Review the list for possible deletion and cost savings."
            ),
            Self::NothingToAnalyze => {
                "✅ No VM backups found (or accessible) to analyze.".to_string()
            }
            Self::Compliant { total } => format!(
                "✅ All {total} VM backups found are compliant (have a policy or an active volume)."
            ),
        }
    }
}

/// Result of one run, returned to the caller after notifying.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// Backups examined across every region and compartment.
    pub total_backups: usize,
    /// Orphan lines in scan order, or the single critical line.
    pub lines: Vec<String>,
    pub duration: Duration,
}

impl ScanReport {
    fn critical() -> Self {
        Self {
            outcome: ScanOutcome::Critical,
            total_backups: 0,
            lines: vec![CRITICAL_SUMMARY.to_string()],
            duration: Duration::ZERO,
        }
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }
}

/// Drives a run over the configured regions.
///
/// Regions, compartments and pages are visited strictly one after another,
/// so report lines follow region order, then compartment listing order,
/// then backup listing order.
pub struct ScanOrchestrator {
    identity: Arc<dyn IdentityApi>,
    connector: Arc<dyn BlockStorageConnector>,
    notifier: Arc<dyn Notifier>,
    scan: ScanConfig,
    title: String,
}

impl ScanOrchestrator {
    pub fn new(
        identity: Arc<dyn IdentityApi>,
        connector: Arc<dyn BlockStorageConnector>,
        notifier: Arc<dyn Notifier>,
        scan: ScanConfig,
    ) -> Self {
        Self {
            identity,
            connector,
            notifier,
            scan,
            title: NotifierConfig::default().title,
        }
    }

    /// Title used in the notification header.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[instrument(skip(self), fields(regions = self.scan.regions.len()))]
    pub async fn run(&self, tenancy_id: &str) -> ScanReport {
        let start = Instant::now();
        tracing::info!("Starting orphaned backup scan");

        let filter = CompartmentFilter::new(
            self.scan.excluded_compartments.clone(),
            self.scan.include_root,
        );
        let compartments = list_compartments(self.identity.as_ref(), tenancy_id, &filter).await;
        if compartments.is_empty() {
            tracing::error!("No compartments to scan, aborting run");
            let report = ScanReport::critical();
            self.notify(&report).await;
            return report;
        }

        let mut lines = Vec::new();
        let mut total_backups = 0;

        for region in &self.scan.regions {
            tracing::info!(region = %region.name, code = %region.code, "Scanning region");

            let storage = match self.connector.bind(&region.code) {
                Ok(storage) => storage,
                Err(e) => {
                    tracing::error!(error = %e, region = %region.name, "Failed to bind block storage client, skipping region");
                    continue;
                }
            };

            for compartment in &compartments {
                let backups = collect_backups(storage.as_ref(), compartment).await;
                total_backups += backups.len();

                for backup in backups.iter().filter(|b| is_orphan(b)) {
                    tracing::warn!(
                        backup = %backup.display_name,
                        compartment = %compartment.name,
                        "Orphaned backup found"
                    );
                    lines.push(format_orphan_line(backup, &compartment.name, &region.code));
                }
            }
        }

        let report = ScanReport {
            outcome: ScanOutcome::classify(lines.len(), total_backups),
            total_backups,
            lines,
            duration: start.elapsed(),
        };

        tracing::info!(
            total_backups = report.total_backups,
            orphans = report.lines.len(),
            duration_ms = report.duration.as_millis() as u64,
            "Scan finished"
        );

        self.notify(&report).await;
        report
    }

    async fn notify(&self, report: &ScanReport) {
        let details = match report.outcome {
            ScanOutcome::Critical => Vec::new(),
            _ => report.lines.clone(),
        };
        let region = self
            .scan
            .primary_region()
            .map(|r| r.name.clone())
            .unwrap_or_default();

        let notification = Notification {
            title: self.title.clone(),
            summary: report.outcome.summary(),
            details,
            severity: report.outcome.severity(),
            duration: report.duration,
            region,
        };
        self.notifier.notify(&notification).await;
    }
}
