//! Dictionary definitions and instant answers.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::form_urlencoded;
use wren_agent::adapters::{AnswerEngine, Dictionary};
use wren_core::domain::results::{AnswerResponse, Definition};
use wren_core::errors::ProviderError;

use crate::http::{decode, send, transport_error};

const WORDNIK: &str = "wordnik";
const WORDNIK_BASE: &str = "https://api.wordnik.com/v4/word.json";

const DUCKDUCKGO: &str = "duckduckgo";

pub struct WordnikDictionary {
    client: Client,
    api_key: SecretString,
}

impl WordnikDictionary {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct WordnikDefinition {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Entries without text are dropped; at most one definition is kept.
fn first_definition(entries: Vec<WordnikDefinition>, requested: &str) -> Vec<Definition> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let text = entry.text.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())?;
            Some(Definition { word: entry.word.unwrap_or_else(|| requested.to_string()), text })
        })
        .take(1)
        .collect()
}

#[async_trait]
impl Dictionary for WordnikDictionary {
    async fn define(&self, word: &str) -> Result<Vec<Definition>, ProviderError> {
        let encoded: String = form_urlencoded::byte_serialize(word.as_bytes()).collect();
        let request = self
            .client
            .get(format!("{WORDNIK_BASE}/{encoded}/definitions"))
            .query(&[("limit", "1"), ("useCanonical", "true"), ("api_key", self.api_key.expose_secret())]);

        let response = request.send().await.map_err(|error| transport_error(WORDNIK, error))?;
        // Unknown words come back as 404 rather than an empty list.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: WORDNIK.to_string(),
                status: response.status().as_u16(),
                message: "definition lookup failed".to_string(),
            });
        }
        let body = response.bytes().await.map_err(|error| transport_error(WORDNIK, error))?;
        let entries: Vec<WordnikDefinition> = decode(WORDNIK, &body)?;
        Ok(first_definition(entries, word))
    }
}

pub struct DuckDuckGoAnswers {
    client: Client,
    base_url: String,
}

impl DuckDuckGoAnswers {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into().trim_end_matches('/').to_string() }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    heading: String,
    #[serde(default)]
    redirect: String,
}

impl From<InstantAnswer> for AnswerResponse {
    fn from(answer: InstantAnswer) -> Self {
        Self { abstract_text: answer.abstract_text, heading: answer.heading, redirect_url: answer.redirect }
    }
}

#[async_trait]
impl AnswerEngine for DuckDuckGoAnswers {
    async fn query(&self, text: &str) -> Result<AnswerResponse, ProviderError> {
        let request = self.client.get(format!("{}/", self.base_url)).query(&[
            ("q", text),
            ("format", "json"),
            ("no_html", "1"),
            ("no_redirect", "1"),
            ("skip_disambig", "1"),
        ]);
        // Bang queries answer with an empty body when nothing redirects.
        let response = send(DUCKDUCKGO, request).await?;
        let body = response.bytes().await.map_err(|error| transport_error(DUCKDUCKGO, error))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(AnswerResponse::default());
        }
        let answer: InstantAnswer = decode(DUCKDUCKGO, &body)?;
        Ok(answer.into())
    }
}
