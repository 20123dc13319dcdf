//! Scan scope configuration: regions and compartment filtering.
//!
//! # Example
//!
//! ```toml
//! [scan]
//! excluded_compartments = ["ManagedCompartmentForPaaS"]
//! include_root = true
//!
//! [[scan.regions]]
//! name = "Vinhedo"
//! code = "sa-vinhedo-1"
//! ```

use serde::{Deserialize, Serialize};

/// A region to scan: display name plus the provider region code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    /// Human-readable name used in reports (e.g. "Vinhedo").
    pub name: String,
    /// Provider region identifier (e.g. "sa-vinhedo-1").
    pub code: String,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Which regions and compartments a run covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Regions scanned in order. Extending coverage means adding entries.
    /// Default: Vinhedo (sa-vinhedo-1)
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,

    /// Compartment names that are never scanned, even when active.
    /// Default: the platform-managed PaaS compartment.
    #[serde(default = "default_excluded_compartments")]
    pub excluded_compartments: Vec<String>,

    /// Whether the tenancy root compartment is scanned too.
    /// Default: true
    #[serde(default = "default_true")]
    pub include_root: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            excluded_compartments: default_excluded_compartments(),
            include_root: true,
        }
    }
}

impl ScanConfig {
    /// Region whose name appears in the report footer.
    pub fn primary_region(&self) -> Option<&RegionConfig> {
        self.regions.first()
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.regions.is_empty() {
            return Err("scan.regions must contain at least one region".into());
        }
        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(format!("scan.regions entry '{}' has an empty name", region.code));
            }
            if region.code.trim().is_empty() {
                return Err(format!("scan.regions entry '{}' has an empty code", region.name));
            }
        }
        Ok(())
    }
}

fn default_regions() -> Vec<RegionConfig> {
    vec![RegionConfig::new("Vinhedo", "sa-vinhedo-1")]
}

fn default_excluded_compartments() -> Vec<String> {
    vec!["ManagedCompartmentForPaaS".to_string()]
}

fn default_true() -> bool {
    true
}
