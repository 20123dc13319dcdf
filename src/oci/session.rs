//! Per-invocation cloud sessions.

use std::sync::Arc;

use reqwest::Client;

use super::{
    AuthError, BlockStorageConnector, BlockstorageConnector, IdentityApi, IdentityClient,
    OciHttpClient, RequestSigner, ResourcePrincipalSigner,
};
use crate::config::OciConfig;

/// Authenticated clients for one audit run.
#[derive(Clone)]
pub struct CloudSession {
    pub tenancy_id: String,
    pub identity: Arc<dyn IdentityApi>,
    pub block_storage: Arc<dyn BlockStorageConnector>,
}

impl std::fmt::Debug for CloudSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudSession")
            .field("tenancy_id", &self.tenancy_id)
            .finish_non_exhaustive()
    }
}

/// Opens a [`CloudSession`] at the start of each invocation.
pub trait SessionProvider: Send + Sync {
    fn open(&self) -> Result<CloudSession, AuthError>;
}

/// Sessions authenticated with the function's resource principal.
#[derive(Debug, Clone)]
pub struct ResourcePrincipalSessions {
    http: Client,
    config: OciConfig,
}

impl ResourcePrincipalSessions {
    pub fn new(http: Client, config: OciConfig) -> Self {
        Self { http, config }
    }
}

impl SessionProvider for ResourcePrincipalSessions {
    fn open(&self) -> Result<CloudSession, AuthError> {
        let signer = ResourcePrincipalSigner::from_env()?;
        let tenancy_id = signer.tenancy_id().to_string();
        let region = signer.region().to_string();
        let signer: Arc<dyn RequestSigner> = Arc::new(signer);

        // The identity endpoint lives in the function's own region
        let identity = OciHttpClient::for_region(
            self.http.clone(),
            signer.clone(),
            &self.config.identity_endpoint,
            &region,
            self.config.timeout(),
        )
        .map_err(|e| AuthError::InvalidRegion(e.to_string()))?;

        Ok(CloudSession {
            tenancy_id,
            identity: Arc::new(IdentityClient::new(identity)),
            block_storage: Arc::new(BlockstorageConnector::new(
                self.http.clone(),
                signer,
                self.config.blockstorage_endpoint.clone(),
                self.config.timeout(),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oci::test_keys::{TEST_RSA_PRIVATE_KEY, resource_principal_token};

    #[test]
    fn test_open_with_resource_principal_environment() {
        let token = resource_principal_token("ocid1.tenancy.oc1..session");
        temp_env::with_vars(
            [
                ("OCI_RESOURCE_PRINCIPAL_VERSION", Some("2.2")),
                ("OCI_RESOURCE_PRINCIPAL_RPST", Some(token.as_str())),
                ("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM", Some(TEST_RSA_PRIVATE_KEY)),
                ("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE", None),
                ("OCI_RESOURCE_PRINCIPAL_REGION", Some("sa-vinhedo-1")),
            ],
            || {
                let sessions = ResourcePrincipalSessions::new(Client::new(), OciConfig::default());
                let session = sessions.open().unwrap();

                assert_eq!(session.tenancy_id, "ocid1.tenancy.oc1..session");
                assert!(session.block_storage.bind("us-ashburn-1").is_ok());
            },
        );
    }

    #[test]
    fn test_open_without_environment_fails() {
        temp_env::with_vars_unset(
            [
                "OCI_RESOURCE_PRINCIPAL_VERSION",
                "OCI_RESOURCE_PRINCIPAL_RPST",
                "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM",
                "OCI_RESOURCE_PRINCIPAL_REGION",
            ],
            || {
                let sessions = ResourcePrincipalSessions::new(Client::new(), OciConfig::default());
                let err = sessions.open().unwrap_err();
                assert!(matches!(err, AuthError::MissingVariable(_)));
            },
        );
    }
}
