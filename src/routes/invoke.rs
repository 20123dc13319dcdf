//! `POST /call`: one audit per invocation.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{AppState, audit::ScanReport};

/// Body returned when the function cannot obtain credentials.
pub const AUTH_ERROR_BODY: &str = "OCI auth error";

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub status: String,
    /// Orphan lines, or the single critical line when enumeration failed.
    pub logs: Vec<String>,
    pub count: usize,
}

impl From<ScanReport> for InvokeResponse {
    fn from(report: ScanReport) -> Self {
        Self {
            status: "completed".to_string(),
            count: report.count(),
            logs: report.lines,
        }
    }
}

/// Run the audit. The request body is ignored.
#[tracing::instrument(name = "function.invoke", skip(state))]
pub async fn invoke(State(state): State<AppState>) -> Response {
    tracing::info!("Orphan finder invoked");

    match state.run_scan().await {
        Ok(report) => (StatusCode::OK, Json(InvokeResponse::from(report))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to obtain resource principal credentials");
            (StatusCode::INTERNAL_SERVER_ERROR, AUTH_ERROR_BODY).into_response()
        }
    }
}
