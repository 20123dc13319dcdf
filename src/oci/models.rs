//! OCI resource models, as returned by the Identity and Core REST APIs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Defined tags: namespace -> key -> value.
pub type DefinedTags = HashMap<String, HashMap<String, serde_json::Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompartmentLifecycleState {
    Creating,
    Active,
    Inactive,
    Deleting,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// A compartment (organizational scope) of a tenancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: String,
    pub name: String,
    pub lifecycle_state: CompartmentLifecycleState,
    /// Parent compartment. Absent for the tenancy root.
    #[serde(default, rename = "compartmentId")]
    pub parent_id: Option<String>,
}

impl Compartment {
    pub fn is_active(&self) -> bool {
        self.lifecycle_state == CompartmentLifecycleState::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupLifecycleState {
    Creating,
    Available,
    Terminating,
    Terminated,
    Faulty,
    RequestReceived,
    #[serde(other)]
    Unknown,
}

impl BackupLifecycleState {
    /// Value used in the `lifecycleState` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Available => "AVAILABLE",
            Self::Terminating => "TERMINATING",
            Self::Terminated => "TERMINATED",
            Self::Faulty => "FAULTY",
            Self::RequestReceived => "REQUEST_RECEIVED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A point-in-time backup of a boot volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootVolumeBackup {
    pub id: String,
    pub display_name: String,
    #[serde(default, rename = "sizeInGBs")]
    pub size_in_gbs: Option<i64>,
    pub time_created: DateTime<Utc>,
    pub lifecycle_state: BackupLifecycleState,
    /// Cleared by OCI once the originating boot volume is deleted.
    #[serde(default)]
    pub source_boot_volume_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub defined_tags: DefinedTags,
    #[serde(default, deserialize_with = "null_as_default")]
    pub freeform_tags: HashMap<String, String>,
}

/// Tag maps may come back as `null`; treat that as no tags.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page (`opc-next-page`), if there is one.
    pub next_page: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}
