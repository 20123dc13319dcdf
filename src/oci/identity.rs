//! Identity service: compartments.

use async_trait::async_trait;

use super::{Compartment, IdentityApi, OciHttpClient, OciResult, Page};

const API_VERSION: &str = "/20160918";

/// REST implementation of [`IdentityApi`].
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: OciHttpClient,
}

impl IdentityClient {
    pub fn new(client: OciHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn list_compartments_page(
        &self,
        tenancy_id: &str,
        page: Option<&str>,
    ) -> OciResult<Page<Compartment>> {
        self.client
            .get_page(
                &format!("{API_VERSION}/compartments"),
                &[
                    ("compartmentId", tenancy_id),
                    ("compartmentIdInSubtree", "true"),
                    ("accessLevel", "ANY"),
                    ("lifecycleState", "ACTIVE"),
                ],
                page,
            )
            .await
    }

    async fn get_compartment(&self, compartment_id: &str) -> OciResult<Compartment> {
        self.client
            .get_json(&format!("{API_VERSION}/compartments/{compartment_id}"), &[])
            .await
    }
}
