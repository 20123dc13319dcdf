//! Configuration module for the orphan finder.
//!
//! The finder is configured via an optional TOML file, with support for
//! environment variable interpolation using `${VAR_NAME}` syntax. Every
//! section has defaults, so the function runs without any file at all.
//!
//! # Example
//!
//! ```toml
//! [notifier]
//! webhook_url = "${SLACK_WEBHOOK_URL}"
//! timeout_secs = 10
//!
//! [[scan.regions]]
//! name = "Vinhedo"
//! code = "sa-vinhedo-1"
//!
//! [[scan.regions]]
//! name = "Ashburn"
//! code = "us-ashburn-1"
//! ```

mod notifier;
mod observability;
mod oci;
mod scan;
mod server;

use std::path::Path;

pub use notifier::*;
pub use observability::*;
pub use oci::*;
pub use scan::*;
use serde::{Deserialize, Serialize};
pub use server::*;

/// Environment variable holding the chat webhook URL.
pub const WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";

/// Environment variable set by the Fn runtime with the listener address.
pub const FN_LISTENER_ENV: &str = "FN_LISTENER";

/// Root configuration for the orphan finder.
///
/// Read once at process start and passed explicitly to everything that needs
/// it; nothing reads the environment after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FinderConfig {
    /// Chat webhook delivery.
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Which regions and compartments are scanned.
    #[serde(default)]
    pub scan: ScanConfig,

    /// OCI REST endpoints and request limits.
    #[serde(default)]
    pub oci: OciConfig,

    /// Fn listener configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl FinderConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let mut config: FinderConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    /// Load the configuration the way the function container expects it:
    /// an optional file, then the runtime's environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Apply environment overrides through the given lookup.
    ///
    /// `SLACK_WEBHOOK_URL` replaces the configured webhook; `FN_LISTENER`
    /// replaces the configured listener. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(WEBHOOK_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.notifier.webhook_url = Some(url);
        }
        if let Some(listener) = lookup(FN_LISTENER_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.listener = Some(listener);
        }
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&mut self) -> Result<(), ConfigError> {
        self.notifier.validate().map_err(ConfigError::Validation)?;
        self.scan.validate().map_err(ConfigError::Validation)?;
        self.oci.validate().map_err(ConfigError::Validation)?;

        Ok(())
    }

    /// Generate the JSON schema as a pretty-printed JSON string.
    #[cfg(feature = "json-schema")]
    pub fn json_schema_string() -> String {
        serde_json::to_string_pretty(&schemars::schema_for!(FinderConfig))
            .expect("schema serialization should not fail")
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in the format `${VAR_NAME}`.
/// Skips variables that appear after a `#` on the same line.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid");
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');

        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = whole.end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
