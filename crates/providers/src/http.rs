//! Shared HTTP plumbing: one client per process, uniform error mapping.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use wren_core::errors::ProviderError;

const USER_AGENT: &str = concat!("wren/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Builds the client every adapter shares. The timeout bounds each whole request.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).user_agent(USER_AGENT).build()
}

pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::Timeout { provider: provider.to_string() };
    }
    ProviderError::transport(provider, error.to_string())
}

/// Sends `request` and fails on any non-2xx status.
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(|error| transport_error(provider, error))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider: provider.to_string(),
        status: status.as_u16(),
        message: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
    })
}

pub(crate) async fn send_json<T: DeserializeOwned>(provider: &str, request: RequestBuilder) -> Result<T, ProviderError> {
    let response = send(provider, request).await?;
    let body = response.bytes().await.map_err(|error| transport_error(provider, error))?;
    decode(provider, &body)
}

pub(crate) fn decode<T: DeserializeOwned>(provider: &str, body: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(body).map_err(|error| ProviderError::decode(provider, error.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use wren_core::errors::ProviderError;

    use super::{decode, truncate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        ok: bool,
    }

    #[test]
    fn decode_errors_name_the_provider() {
        assert_eq!(decode::<Payload>("flickr", br#"{"ok":true}"#), Ok(Payload { ok: true }));
        let error = decode::<Payload>("flickr", b"<html>").err();
        assert!(matches!(error, Some(ProviderError::Decode { ref provider, .. }) if provider == "flickr"));
    }

    #[test]
    fn long_error_bodies_are_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }
}
