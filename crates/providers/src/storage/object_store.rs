use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::{form_urlencoded, Url};
use wren_agent::adapters::{ArtifactSource, PublishDestination};
use wren_core::config::ObjectStoreConfig;
use wren_core::errors::ProviderError;

use super::is_safe_artifact_name;
use super::sigv4::{self, Credentials};
use crate::http::{send, transport_error};

const PROVIDER: &str = "object_store";
const CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// S3-compatible bucket. Artifacts are written here and served back through
/// `<public_base_url>/answer/<filename>`.
pub struct ObjectStore {
    client: Client,
    configured: bool,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    access_key_id: String,
    secret_access_key: SecretString,
    public_base_url: String,
}

impl ObjectStore {
    pub fn new(client: Client, config: &ObjectStoreConfig, public_base_url: &str) -> Self {
        Self {
            client,
            configured: config.is_configured(),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.as_ref().map(|endpoint| endpoint.trim_end_matches('/').to_string()),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Virtual-host addressing on AWS; path-style on a custom endpoint.
    fn object_url(&self, key: &str) -> Result<Url, ProviderError> {
        let raw = match &self.endpoint {
            Some(endpoint) => format!("{endpoint}/{}/{}", self.bucket, sigv4::canonical_uri(key)),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, sigv4::canonical_uri(key)),
        };
        Url::parse(&raw).map_err(|error| ProviderError::transport(PROVIDER, format!("invalid object url: {error}")))
    }

    fn serving_url(&self, filename: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(filename.as_bytes()).collect();
        format!("{}/answer/{encoded}", self.public_base_url)
    }

    fn signed_request(&self, method: Method, key: &str, payload: &[u8]) -> Result<reqwest::RequestBuilder, ProviderError> {
        let url = self.object_url(key)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ProviderError::transport(PROVIDER, "object url has no host")),
        };

        let now = Utc::now();
        let payload_hash = sigv4::sha256_hex(payload);
        let amz_date = sigv4::amz_date(now);
        let headers = BTreeMap::from([
            ("host".to_string(), host),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ]);
        let credentials = Credentials {
            access_key_id: &self.access_key_id,
            secret_access_key: self.secret_access_key.expose_secret(),
            region: &self.region,
        };
        let authorization =
            sigv4::authorization(&credentials, method.as_str(), url.path(), &headers, &payload_hash, now);

        Ok(self
            .client
            .request(method, url)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amz_date)
            .header("authorization", authorization))
    }
}

#[async_trait]
impl PublishDestination for ObjectStore {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn attempt_upload(&self, filename: &str, content: &[u8]) -> Result<String, ProviderError> {
        if !is_safe_artifact_name(filename) {
            return Err(ProviderError::transport(PROVIDER, format!("refusing artifact name `{filename}`")));
        }
        let request = self
            .signed_request(Method::PUT, filename, content)?
            .header("content-type", CONTENT_TYPE)
            .body(content.to_vec());
        send(PROVIDER, request).await?;
        debug!(event_name = "providers.object_store.uploaded", filename, bytes = content.len(), "artifact stored");
        Ok(self.serving_url(filename))
    }
}

#[async_trait]
impl ArtifactSource for ObjectStore {
    async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        if !self.configured {
            return Err(ProviderError::Unsupported { provider: PROVIDER.to_string(), operation: "fetch".to_string() });
        }
        if !is_safe_artifact_name(filename) {
            return Ok(None);
        }
        let request = self.signed_request(Method::GET, filename, b"")?;
        let response = request.send().await.map_err(|error| transport_error(PROVIDER, error))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: response.status().as_u16(),
                message: "artifact read failed".to_string(),
            });
        }
        let body = response.bytes().await.map_err(|error| transport_error(PROVIDER, error))?;
        Ok(Some(body.to_vec()))
    }
}
