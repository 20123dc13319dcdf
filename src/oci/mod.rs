//! Minimal OCI REST bindings: the Identity and Block Storage calls the
//! audit needs, HTTP signature authentication and pagination.
//!
//! The audit core only sees the [`IdentityApi`], [`BlockStorageApi`] and
//! [`BlockStorageConnector`] traits; the REST clients in this module are one
//! implementation of them.

mod auth;
mod blockstorage;
pub(crate) mod client;
mod error;
mod identity;
mod models;
mod pagination;
mod session;
#[cfg(test)]
pub(crate) mod test_keys;

use std::sync::Arc;

use async_trait::async_trait;
pub use auth::{AuthError, RequestSigner, ResourcePrincipalSigner};
pub use blockstorage::{BlockstorageClient, BlockstorageConnector};
pub use client::OciHttpClient;
pub use error::{NOT_AUTHORIZED_OR_NOT_FOUND, OciError, OciResult};
pub use identity::IdentityClient;
pub use models::*;
pub use pagination::list_all;
pub use session::{CloudSession, ResourcePrincipalSessions, SessionProvider};

/// Identity service operations used by the audit.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// One page of the active compartments anywhere under `tenancy_id`.
    /// The tenancy root itself is not part of the listing.
    async fn list_compartments_page(
        &self,
        tenancy_id: &str,
        page: Option<&str>,
    ) -> OciResult<Page<Compartment>>;

    /// Fetch a single compartment (including the tenancy root).
    async fn get_compartment(&self, compartment_id: &str) -> OciResult<Compartment>;
}

/// Block storage operations used by the audit, bound to one region.
#[async_trait]
pub trait BlockStorageApi: Send + Sync {
    /// One page of the boot volume backups of a compartment in the given
    /// lifecycle state.
    async fn list_boot_volume_backups_page(
        &self,
        compartment_id: &str,
        lifecycle_state: BackupLifecycleState,
        page: Option<&str>,
    ) -> OciResult<Page<BootVolumeBackup>>;
}

/// Produces region-bound [`BlockStorageApi`] clients.
pub trait BlockStorageConnector: Send + Sync {
    fn bind(&self, region_code: &str) -> OciResult<Arc<dyn BlockStorageApi>>;
}
