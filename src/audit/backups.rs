//! Boot volume backup collection for one compartment in one region.

use crate::oci::{
    BackupLifecycleState, BlockStorageApi, BootVolumeBackup, Compartment, OciResult, list_all,
};

/// Every `AVAILABLE` backup of `compartment_id`, all pages read.
pub async fn list_available_backups(
    storage: &dyn BlockStorageApi,
    compartment_id: &str,
) -> OciResult<Vec<BootVolumeBackup>> {
    list_all(|page| async move {
        storage
            .list_boot_volume_backups_page(
                compartment_id,
                BackupLifecycleState::Available,
                page.as_deref(),
            )
            .await
    })
    .await
}

/// Collect the available backups of a compartment, skipping it on error.
///
/// A permission error is expected for compartments the function's policy
/// does not cover and is only a warning. Either way the compartment
/// contributes no backups and the scan moves on.
pub async fn collect_backups(
    storage: &dyn BlockStorageApi,
    compartment: &Compartment,
) -> Vec<BootVolumeBackup> {
    match list_available_backups(storage, &compartment.id).await {
        Ok(backups) => {
            tracing::info!(
                compartment = %compartment.name,
                count = backups.len(),
                "Backups found"
            );
            backups
        }
        Err(e) if e.is_not_authorized() => {
            tracing::warn!(
                compartment = %compartment.name,
                "No permission on compartment, skipping"
            );
            Vec::new()
        }
        Err(e) => {
            tracing::error!(
                compartment = %compartment.name,
                error = %e,
                "Failed to list backups, skipping compartment"
            );
            Vec::new()
        }
    }
}
