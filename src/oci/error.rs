//! Errors raised by the OCI bindings.

use serde::Deserialize;

/// OCI error code for a missing resource or a missing permission.
/// OCI deliberately does not distinguish the two.
pub const NOT_AUTHORIZED_OR_NOT_FOUND: &str = "NotAuthorizedOrNotFound";

#[derive(Debug, thiserror::Error)]
pub enum OciError {
    /// The service answered with an error body.
    #[error("OCI service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        opc_request_id: Option<String>,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode OCI response: {0}")]
    Decode(String),

    #[error("Invalid region '{0}'")]
    InvalidRegion(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl OciError {
    /// Whether this is the service's permission-denied (or not found) answer.
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, OciError::Service { code, .. } if code == NOT_AUTHORIZED_OR_NOT_FOUND)
    }

    /// Build a service error from a non-success response body.
    pub(crate) fn from_response(status: u16, body: &str, opc_request_id: Option<String>) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            code: String,
            message: String,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => OciError::Service {
                status,
                code: parsed.code,
                message: parsed.message,
                opc_request_id,
            },
            Err(_) => OciError::Service {
                status,
                code: format!("Http{status}"),
                message: body.chars().take(200).collect(),
                opc_request_id,
            },
        }
    }
}

pub type OciResult<T> = Result<T, OciError>;
