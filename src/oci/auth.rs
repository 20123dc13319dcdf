//! Request signing and resource principal credentials.
//!
//! OCI authenticates REST calls with HTTP signatures (draft-cavage): the
//! `date`, `(request-target)` and `host` headers are signed with RSA-SHA256
//! and the result goes into the `Authorization` header.
//!
//! Inside an OCI Function the credentials come from the resource principal:
//! the runtime provides a session token (RPST) and a private key through
//! `OCI_RESOURCE_PRINCIPAL_*` environment variables. Each variable holds
//! either the value itself or the path of a file containing it.

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderValue, Method, header};
use jsonwebtoken::{Algorithm, EncodingKey};
use serde::Deserialize;
use url::Url;

use super::{OciError, OciResult};

pub const RP_VERSION_ENV: &str = "OCI_RESOURCE_PRINCIPAL_VERSION";
pub const RP_RPST_ENV: &str = "OCI_RESOURCE_PRINCIPAL_RPST";
pub const RP_PRIVATE_PEM_ENV: &str = "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM";
pub const RP_PRIVATE_PEM_PASSPHRASE_ENV: &str = "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE";
pub const RP_REGION_ENV: &str = "OCI_RESOURCE_PRINCIPAL_REGION";

/// The only resource principal protocol version Fn currently issues.
const SUPPORTED_RP_VERSION: &str = "2.2";

const SIGNED_HEADERS: &str = "date (request-target) host";

/// Credential acquisition errors. Fatal for an invocation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Environment variable not set: {0}")]
    MissingVariable(&'static str),

    #[error("Unsupported resource principal version '{0}'")]
    UnsupportedVersion(String),

    #[error("Encrypted resource principal keys are not supported")]
    EncryptedKey,

    #[error("Failed to read {0}: {1}")]
    Io(String, std::io::Error),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid resource principal session token: {0}")]
    InvalidToken(String),

    #[error("Invalid resource principal region: {0}")]
    InvalidRegion(String),
}

/// Signs outgoing OCI requests.
pub trait RequestSigner: Send + Sync {
    /// Add the signature headers for a request to `url`.
    fn sign(&self, method: &Method, url: &Url, headers: &mut HeaderMap) -> OciResult<()>;
}

/// Resource principal credentials of the running function.
pub struct ResourcePrincipalSigner {
    key_id: String,
    key: EncodingKey,
    tenancy_id: String,
    region: String,
}

impl std::fmt::Debug for ResourcePrincipalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePrincipalSigner")
            .field("tenancy_id", &self.tenancy_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SessionClaims {
    res_tenant: String,
}

impl ResourcePrincipalSigner {
    /// Read the resource principal from the process environment.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the resource principal through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(AuthError::MissingVariable(name))
        };

        let version = require(RP_VERSION_ENV)?;
        if version.trim() != SUPPORTED_RP_VERSION {
            return Err(AuthError::UnsupportedVersion(version));
        }
        if lookup(RP_PRIVATE_PEM_PASSPHRASE_ENV).is_some_and(|v| !v.is_empty()) {
            return Err(AuthError::EncryptedKey);
        }

        let rpst = value_or_file(&require(RP_RPST_ENV)?, |v| v.contains('.'))?;
        let pem = value_or_file(&require(RP_PRIVATE_PEM_ENV)?, |v| v.starts_with("-----BEGIN"))?;
        let region = require(RP_REGION_ENV)?;

        Self::new(&rpst, &pem, region.trim())
    }

    /// Build a signer from a session token and its private key.
    pub fn new(rpst: &str, private_key_pem: &str, region: &str) -> Result<Self, AuthError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        let claims = decode_claims(rpst)?;

        Ok(Self {
            key_id: format!("ST${rpst}"),
            key,
            tenancy_id: claims.res_tenant,
            region: region.to_string(),
        })
    }

    /// Tenancy OCID the function runs in.
    pub fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    /// Region the function runs in.
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl RequestSigner for ResourcePrincipalSigner {
    fn sign(&self, method: &Method, url: &Url, headers: &mut HeaderMap) -> OciResult<()> {
        let date = http_date(Utc::now());
        let host = host_header(url)?;
        let message = signing_string(method, url, &date, &host);

        let signature = jsonwebtoken::crypto::sign(message.as_bytes(), &self.key, Algorithm::RS256)
            .map_err(|e| OciError::Signing(e.to_string()))?;
        // jsonwebtoken emits base64url; OCI expects standard base64
        let raw = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| OciError::Signing(e.to_string()))?;

        let authorization = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            SIGNED_HEADERS,
            STANDARD.encode(raw)
        );

        headers.insert(header::DATE, header_value(&date)?);
        headers.insert(header::HOST, header_value(&host)?);
        headers.insert(header::AUTHORIZATION, header_value(&authorization)?);

        Ok(())
    }
}

/// Use `value` as-is when it looks like the value itself, otherwise read it
/// as a file path.
fn value_or_file(value: &str, is_inline: impl Fn(&str) -> bool) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if is_inline(trimmed) && !trimmed.starts_with('/') {
        return Ok(trimmed.to_string());
    }

    std::fs::read_to_string(trimmed)
        .map(|contents| contents.trim().to_string())
        .map_err(|e| AuthError::Io(trimmed.to_string(), e))
}

fn decode_claims(rpst: &str) -> Result<SessionClaims, AuthError> {
    let payload = rpst
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("not a JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// RFC 7231 date, as required by the `date` header.
fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn host_header(url: &Url) -> OciResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| OciError::Signing(format!("URL has no host: {url}")))?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn signing_string(method: &Method, url: &Url, date: &str, host: &str) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    format!(
        "date: {date}\n(request-target): {} {target}\nhost: {host}",
        method.as_str().to_lowercase()
    )
}

fn header_value(value: &str) -> OciResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| OciError::Signing(e.to_string()))
}
