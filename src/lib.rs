//! Scheduled audit for OCI boot volume backups left behind by deleted
//! volumes and not covered by a backup policy.
//!
//! The crate is deployed as an OCI Function: the Fn runtime calls
//! `POST /call` on a unix socket, the handler opens a resource-principal
//! session, runs one [`audit::ScanOrchestrator`] pass and answers with the
//! orphan lines it found. The same run is available from the command line.

pub mod audit;
pub mod config;
#[cfg(all(unix, feature = "server"))]
pub mod listener;
pub mod notify;
pub mod observability;
pub mod oci;
pub mod routes;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Router, routing::post};
use http::{HeaderName, HeaderValue};
use reqwest::Client;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{
    audit::{ScanOrchestrator, ScanReport},
    config::FinderConfig,
    notify::{Notifier, SlackNotifier},
    oci::{AuthError, ResourcePrincipalSessions, SessionProvider},
};

/// Response header the Fn runtime expects from a function container.
pub const FDK_VERSION_HEADER: &str = "fn-fdk-version";

/// Value of [`FDK_VERSION_HEADER`].
pub const FDK_VERSION: &str = concat!("fdk-rust/", env!("CARGO_PKG_VERSION"));

/// Shared state of the function container.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FinderConfig>,
    pub sessions: Arc<dyn SessionProvider>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// State backed by the resource principal and the Slack webhook.
    pub fn new(config: FinderConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("oci-orphan-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let sessions = Arc::new(ResourcePrincipalSessions::new(
            http.clone(),
            config.oci.clone(),
        ));
        let notifier = Arc::new(SlackNotifier::from_config(http, &config.notifier));

        Ok(Self::with_parts(config, sessions, notifier))
    }

    pub fn with_parts(
        config: FinderConfig,
        sessions: Arc<dyn SessionProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            notifier,
        }
    }

    /// Open a session and run one audit.
    ///
    /// Only credential acquisition can fail; every later failure is folded
    /// into the report.
    pub async fn run_scan(&self) -> Result<ScanReport, AuthError> {
        let session = self.sessions.open()?;
        tracing::debug!(tenancy_id = %session.tenancy_id, "Cloud session opened");

        let orchestrator = ScanOrchestrator::new(
            session.identity,
            session.block_storage,
            self.notifier.clone(),
            self.config.scan.clone(),
        )
        .with_title(self.config.notifier.title.clone());

        Ok(orchestrator.run(&session.tenancy_id).await)
    }
}

/// Router served to the Fn runtime.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/call", post(routes::invoke::invoke))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(FDK_VERSION_HEADER),
            HeaderValue::from_static(FDK_VERSION),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
