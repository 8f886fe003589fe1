//! Fallback destination: a hosted file share that hands back a public link.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use wren_agent::adapters::PublishDestination;
use wren_core::config::FileShareConfig;
use wren_core::errors::ProviderError;

use super::is_safe_artifact_name;
use crate::http::{decode, send, transport_error};

const PROVIDER: &str = "file_share";
const UPLOAD_URL: &str = "https://content.dropboxapi.com/2/files/upload";
const SHARE_URL: &str = "https://api.dropboxapi.com/2/sharing/create_shared_link_with_settings";
const PREVIEW_HOST: &str = "www.dropbox.com";
const DIRECT_HOST: &str = "dl.dropboxusercontent.com";

pub struct FileShare {
    client: Client,
    configured: bool,
    access_token: SecretString,
    folder: String,
}

impl FileShare {
    pub fn new(client: Client, config: &FileShareConfig) -> Self {
        let folder = format!("/{}", config.folder.trim_matches('/'));
        Self {
            client,
            configured: config.is_configured(),
            access_token: config.access_token.clone(),
            folder: if folder == "/" { String::new() } else { folder },
        }
    }

    fn remote_path(&self, filename: &str) -> String {
        format!("{}/{filename}", self.folder)
    }

    async fn share(&self, path: &str) -> Result<String, ProviderError> {
        let request = self
            .client
            .post(SHARE_URL)
            .bearer_auth(self.access_token.expose_secret())
            .json(&json!({"path": path, "settings": {"requested_visibility": "public"}}));
        let response = request.send().await.map_err(|error| transport_error(PROVIDER, error))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|error| transport_error(PROVIDER, error))?;

        if status.is_success() {
            let link: SharedLink = decode(PROVIDER, &body)?;
            return Ok(link.url);
        }
        // Overwriting a file that was shared before keeps its link.
        if status == StatusCode::CONFLICT {
            if let Some(url) = existing_link(&body) {
                return Ok(url);
            }
        }
        Err(ProviderError::Status {
            provider: PROVIDER.to_string(),
            status: status.as_u16(),
            message: "shared link creation failed".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SharedLink {
    url: String,
}

fn existing_link(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .pointer("/error/shared_link_already_exists/metadata/url")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Preview links point at an HTML viewer; the direct host serves the file itself.
fn direct_link(url: &str) -> String {
    url.replacen(PREVIEW_HOST, DIRECT_HOST, 1)
}

#[async_trait]
impl PublishDestination for FileShare {
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
        let path = self.remote_path(filename);
        let argument = json!({"path": path, "mode": "overwrite", "mute": true}).to_string();
        let request = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(self.access_token.expose_secret())
            .header("Dropbox-API-Arg", argument)
            .header("content-type", "application/octet-stream")
            .body(content.to_vec());
        send(PROVIDER, request).await?;

        let link = self.share(&path).await?;
        debug!(event_name = "providers.file_share.uploaded", filename, "artifact shared");
        Ok(direct_link(&link))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use secrecy::SecretString;
    use wren_agent::adapters::PublishDestination;
    use wren_core::config::FileShareConfig;

    use super::{direct_link, existing_link, FileShare};

    fn share(folder: &str, token: &str) -> FileShare {
        let config = FileShareConfig {
            enabled: true,
            access_token: SecretString::from(token.to_string()),
            folder: folder.to_string(),
        };
        FileShare::new(Client::new(), &config)
    }

    #[test]
    fn files_land_in_the_configured_folder() {
        assert_eq!(share("/wren/", "token").remote_path("a.html"), "/wren/a.html");
        assert_eq!(share("", "token").remote_path("a.html"), "/a.html");
    }

    #[test]
    fn preview_links_are_rewritten_to_the_direct_host() {
        assert_eq!(
            direct_link("https://www.dropbox.com/s/abc123/a.html?dl=0"),
            "https://dl.dropboxusercontent.com/s/abc123/a.html?dl=0"
        );
    }

    #[test]
    fn conflicts_reuse_the_existing_link() {
        let body = br#"{"error_summary":"shared_link_already_exists/..","error":{".tag":"shared_link_already_exists","shared_link_already_exists":{"metadata":{"url":"https://www.dropbox.com/s/x/a.html?dl=0"}}}}"#;
        assert_eq!(existing_link(body).as_deref(), Some("https://www.dropbox.com/s/x/a.html?dl=0"));
        assert_eq!(existing_link(b"{}"), None);
    }

    #[test]
    fn blank_tokens_leave_the_share_unconfigured() {
        assert!(!share("/wren", "  ").is_configured());
        assert_eq!(share("/wren", "t").name(), "file_share");
    }
}
