//! The orphan rule and the report line for an orphaned backup.

use crate::oci::BootVolumeBackup;

/// Console deep link for a boot volume backup.
const CONSOLE_BACKUP_URL: &str = "https://cloud.oracle.com/storage/boot-volume-backups";

/// A backup is orphaned when its source volume is gone AND no policy tag
/// governs it.
///
/// A live source keeps a backup compliant whatever its tags; any defined
/// tag keeps a backup with a dead source compliant. Every defined tag counts
/// as a retention policy, not only backup-policy namespaces.
pub fn is_orphan(backup: &BootVolumeBackup) -> bool {
    source_deleted(backup) && !has_policy(backup)
}

/// OCI clears the source reference once the boot volume (and with it the
/// instance) has been deleted.
fn source_deleted(backup: &BootVolumeBackup) -> bool {
    backup
        .source_boot_volume_id
        .as_deref()
        .is_none_or(str::is_empty)
}

fn has_policy(backup: &BootVolumeBackup) -> bool {
    !backup.defined_tags.is_empty()
}

/// One report line for an orphaned backup, in Slack mrkdwn.
pub fn format_orphan_line(
    backup: &BootVolumeBackup,
    compartment_name: &str,
    region_code: &str,
) -> String {
    let created = backup.time_created.format("%Y-%m-%d");
    let url = format!("{CONSOLE_BACKUP_URL}/{}?region={region_code}", backup.id);
    let size = backup
        .size_in_gbs
        .map(|gb| format!("{gb}GB"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "🪦 *<{url}|{} ({created})>* | Created: {created} | Size: {size} | Compartment: `{compartment_name}`",
        backup.display_name
    )
}
