//! Signed HTTP transport shared by the OCI service clients.

use std::{sync::Arc, time::Duration};

use http::{HeaderMap, Method};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{OciError, OciResult, Page, RequestSigner};

/// Header carrying the next page token of a list call.
const NEXT_PAGE_HEADER: &str = "opc-next-page";
const REQUEST_ID_HEADER: &str = "opc-request-id";

/// A region-bound OCI REST endpoint.
#[derive(Clone)]
pub struct OciHttpClient {
    http: Client,
    signer: Arc<dyn RequestSigner>,
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for OciHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OciHttpClient {
    /// Bind a client to the endpoint produced by `template` for `region`.
    ///
    /// Fails with [`OciError::InvalidRegion`] when the region code is not a
    /// plausible OCI region identifier or the resulting URL does not parse.
    pub fn for_region(
        http: Client,
        signer: Arc<dyn RequestSigner>,
        template: &str,
        region: &str,
        timeout: Duration,
    ) -> OciResult<Self> {
        if !is_valid_region_code(region) {
            return Err(OciError::InvalidRegion(region.to_string()));
        }

        let endpoint = template.replace("{region}", region);
        let base_url = Url::parse(&endpoint)
            .map_err(|e| OciError::InvalidRegion(format!("{region} ({endpoint}: {e})")))?;

        Ok(Self {
            http,
            signer,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET a single JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> OciResult<T> {
        let (body, _) = self.get(path, query).await?;
        decode(&body)
    }

    /// GET one page of a list call. `page` is the token from the previous
    /// page's `opc-next-page` header.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page: Option<&str>,
    ) -> OciResult<Page<T>> {
        let mut query = query.to_vec();
        if let Some(page) = page {
            query.push(("page", page));
        }

        let (body, headers) = self.get(path, &query).await?;
        let items = decode(&body)?;
        let next_page = headers
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Page { items, next_page })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> OciResult<(String, HeaderMap)> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );
        self.signer.sign(&Method::GET, &url, &mut headers)?;

        tracing::debug!(url = %url, "OCI request");

        let response = self
            .http
            .get(url)
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            let request_id = headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(OciError::from_response(status.as_u16(), &body, request_id));
        }

        Ok((body, headers))
    }

    fn url(&self, path: &str) -> OciResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|e| OciError::Decode(e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> OciResult<T> {
    serde_json::from_str(body).map_err(|e| OciError::Decode(e.to_string()))
}

/// OCI region codes look like `sa-vinhedo-1` or `us-ashburn-1`.
fn is_valid_region_code(region: &str) -> bool {
    !region.is_empty()
        && region.contains('-')
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !region.starts_with('-')
        && !region.ends_with('-')
}
