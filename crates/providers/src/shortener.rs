use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use wren_agent::adapters::ShortenerProvider;
use wren_core::config::ShortenerConfig;
use wren_core::errors::ProviderError;

use crate::http::send_json;

const PROVIDER: &str = "bitly";
const ENDPOINT: &str = "https://api-ssl.bitly.com/v4/shorten";

pub struct BitlyShortener {
    client: Client,
    configured: bool,
    access_token: SecretString,
}

impl BitlyShortener {
    pub fn new(client: Client, config: &ShortenerConfig) -> Self {
        Self { client, configured: config.is_configured(), access_token: config.access_token.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct ShortenResponse {
    link: String,
}

#[async_trait]
impl ShortenerProvider for BitlyShortener {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn shorten(&self, url: &str) -> Result<String, ProviderError> {
        let request = self
            .client
            .post(ENDPOINT)
            .bearer_auth(self.access_token.expose_secret())
            .json(&json!({"long_url": url}));
        let response: ShortenResponse = send_json(PROVIDER, request).await?;
        if response.link.trim().is_empty() {
            return Err(ProviderError::decode(PROVIDER, "empty link in response"));
        }
        Ok(response.link)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use secrecy::SecretString;
    use wren_agent::adapters::ShortenerProvider;
    use wren_core::config::ShortenerConfig;

    use super::{BitlyShortener, ShortenResponse};

    #[test]
    fn disabled_shortener_reports_unconfigured() {
        let config = ShortenerConfig { enabled: false, access_token: SecretString::from("token".to_string()) };
        assert!(!BitlyShortener::new(Client::new(), &config).is_configured());
    }

    #[test]
    fn link_is_read_from_the_response() {
        let parsed: Result<ShortenResponse, _> =
            serde_json::from_str(r#"{"id":"bit.ly/abc","link":"https://bit.ly/abc","long_url":"https://x"}"#);
        assert_eq!(parsed.map(|response| response.link).ok().as_deref(), Some("https://bit.ly/abc"));
    }
}
