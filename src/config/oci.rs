//! OCI REST endpoint configuration.
//!
//! Endpoints are URL templates where `{region}` is replaced by the region
//! code. The defaults point at the public OCI endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OCI client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct OciConfig {
    /// Identity service endpoint template.
    /// Default: `https://identity.{region}.oci.oraclecloud.com`
    #[serde(default = "default_identity_endpoint")]
    pub identity_endpoint: String,

    /// Block storage (core services) endpoint template.
    /// Default: `https://iaas.{region}.oraclecloud.com`
    #[serde(default = "default_blockstorage_endpoint")]
    pub blockstorage_endpoint: String,

    /// Timeout for each OCI API request, in seconds.
    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OciConfig {
    fn default() -> Self {
        Self {
            identity_endpoint: default_identity_endpoint(),
            blockstorage_endpoint: default_blockstorage_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OciConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("oci.timeout_secs must be greater than 0".into());
        }
        for (field, template) in [
            ("oci.identity_endpoint", &self.identity_endpoint),
            ("oci.blockstorage_endpoint", &self.blockstorage_endpoint),
        ] {
            let sample = template.replace("{region}", "us-ashburn-1");
            if url::Url::parse(&sample).is_err() {
                return Err(format!("{field} is not a valid URL template: {template}"));
            }
        }
        Ok(())
    }
}

fn default_identity_endpoint() -> String {
    "https://identity.{region}.oci.oraclecloud.com".to_string()
}

fn default_blockstorage_endpoint() -> String {
    "https://iaas.{region}.oraclecloud.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
