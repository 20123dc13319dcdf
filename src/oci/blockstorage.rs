//! Block storage service: boot volume backups.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;

use super::{
    BackupLifecycleState, BlockStorageApi, BlockStorageConnector, BootVolumeBackup,
    OciHttpClient, OciResult, Page, RequestSigner,
};

const API_VERSION: &str = "/20160918";

/// REST implementation of [`BlockStorageApi`], bound to one region.
#[derive(Debug, Clone)]
pub struct BlockstorageClient {
    client: OciHttpClient,
}

impl BlockstorageClient {
    pub fn new(client: OciHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlockStorageApi for BlockstorageClient {
    async fn list_boot_volume_backups_page(
        &self,
        compartment_id: &str,
        lifecycle_state: BackupLifecycleState,
        page: Option<&str>,
    ) -> OciResult<Page<BootVolumeBackup>> {
        self.client
            .get_page(
                &format!("{API_VERSION}/bootVolumeBackups"),
                &[
                    ("compartmentId", compartment_id),
                    ("lifecycleState", lifecycle_state.as_str()),
                ],
                page,
            )
            .await
    }
}

/// Builds region-bound [`BlockstorageClient`]s from an endpoint template.
#[derive(Clone)]
pub struct BlockstorageConnector {
    http: Client,
    signer: Arc<dyn RequestSigner>,
    endpoint_template: String,
    timeout: Duration,
}

impl BlockstorageConnector {
    pub fn new(
        http: Client,
        signer: Arc<dyn RequestSigner>,
        endpoint_template: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            signer,
            endpoint_template: endpoint_template.into(),
            timeout,
        }
    }
}

impl BlockStorageConnector for BlockstorageConnector {
    fn bind(&self, region_code: &str) -> OciResult<Arc<dyn BlockStorageApi>> {
        let client = OciHttpClient::for_region(
            self.http.clone(),
            self.signer.clone(),
            &self.endpoint_template,
            region_code,
            self.timeout,
        )?;
        Ok(Arc::new(BlockstorageClient::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;
    use crate::oci::{OciError, client::tests::StaticSigner};

    #[tokio::test]
    async fn test_list_available_backups_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/20160918/bootVolumeBackups"))
            .and(query_param("compartmentId", "ocid1.compartment.oc1..a"))
            .and(query_param("lifecycleState", "AVAILABLE"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("opc-next-page", "next")
                    .set_body_json(json!([
                        {
                            "id": "ocid1.bootvolumebackup.oc1..b1",
                            "displayName": "web-01",
                            "sizeInGBs": 50,
                            "timeCreated": "2024-01-02T03:04:05Z",
                            "lifecycleState": "AVAILABLE",
                            "sourceBootVolumeId": "ocid1.bootvolume.oc1..v1",
                            "definedTags": {}
                        }
                    ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let connector = BlockstorageConnector::new(
            Client::new(),
            Arc::new(StaticSigner),
            server.uri(),
            Duration::from_secs(5),
        );
        let storage = connector.bind("sa-vinhedo-1").unwrap();
        let page = storage
            .list_boot_volume_backups_page(
                "ocid1.compartment.oc1..a",
                BackupLifecycleState::Available,
                None,
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page.as_deref(), Some("next"));
    }

    #[test]
    fn test_bind_rejects_invalid_region() {
        let connector = BlockstorageConnector::new(
            Client::new(),
            Arc::new(StaticSigner),
            "https://iaas.{region}.oraclecloud.com",
            Duration::from_secs(5),
        );

        let err = connector.bind("").err().unwrap();
        assert!(matches!(err, OciError::InvalidRegion(_)));
    }
}
