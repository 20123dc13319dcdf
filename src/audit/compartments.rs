//! Compartment enumeration.

use crate::oci::{Compartment, IdentityApi, list_all};

/// Decides which compartments are scanned.
#[derive(Debug, Clone, Default)]
pub struct CompartmentFilter {
    excluded_names: Vec<String>,
    include_root: bool,
}

impl CompartmentFilter {
    pub fn new(excluded_names: Vec<String>, include_root: bool) -> Self {
        Self {
            excluded_names,
            include_root,
        }
    }

    /// Whether `compartment` is scanned: active and not reserved.
    pub fn admits(&self, compartment: &Compartment) -> bool {
        compartment.is_active() && !self.excluded_names.iter().any(|n| *n == compartment.name)
    }

    pub fn include_root(&self) -> bool {
        self.include_root
    }
}

/// List every active compartment of the tenancy, root included, minus the
/// ones the filter excludes.
///
/// A failed listing is logged and yields an empty list; the caller treats
/// that as fatal. A failed root lookup only drops the root.
pub async fn list_compartments(
    identity: &dyn IdentityApi,
    tenancy_id: &str,
    filter: &CompartmentFilter,
) -> Vec<Compartment> {
    let listed = list_all(|page| async move {
        identity
            .list_compartments_page(tenancy_id, page.as_deref())
            .await
    })
    .await;

    let mut compartments = match listed {
        Ok(compartments) => compartments,
        Err(e) => {
            tracing::error!(error = %e, tenancy_id, "Failed to list compartments");
            return Vec::new();
        }
    };

    if filter.include_root() {
        match identity.get_compartment(tenancy_id).await {
            Ok(root) => compartments.push(root),
            Err(e) => {
                tracing::debug!(error = %e, tenancy_id, "Root compartment unavailable, skipping it");
            }
        }
    }

    compartments.retain(|c| filter.admits(c));

    tracing::debug!(count = compartments.len(), "Compartments to scan");
    compartments
}
