use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use wren_agent::adapters::CauseFinder;
use wren_core::domain::results::CauseItem;
use wren_core::errors::ProviderError;

use crate::http::send_json;

const PROVIDER: &str = "donorschoose";
const ENDPOINT: &str = "https://api.donorschoose.org/common/json_feed.html";
const MAX_PROPOSALS: u32 = 50;

pub struct DonorsChooseCauses {
    client: Client,
    api_key: SecretString,
}

impl DonorsChooseCauses {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    proposals: Vec<Proposal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Proposal {
    #[serde(default)]
    title: String,
    #[serde(default)]
    school_name: String,
    grade_level: Option<GradeLevel>,
    #[serde(rename = "proposalURL", default)]
    proposal_url: String,
    #[serde(rename = "imageURL", default)]
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct GradeLevel {
    #[serde(default)]
    name: String,
}

fn cause_items(response: FeedResponse) -> Vec<CauseItem> {
    response
        .proposals
        .into_iter()
        .filter(|proposal| !proposal.proposal_url.is_empty())
        .map(|proposal| CauseItem {
            title: proposal.title,
            school_name: proposal.school_name,
            grade_level: proposal.grade_level.map(|grade| grade.name).unwrap_or_default(),
            proposal_url: proposal.proposal_url,
            image_url: proposal.image_url,
        })
        .collect()
}

#[async_trait]
impl CauseFinder for DonorsChooseCauses {
    async fn search_causes(&self, keyword: &str, limit: u32) -> Result<Vec<CauseItem>, ProviderError> {
        let max = limit.clamp(1, MAX_PROPOSALS).to_string();
        let request = self.client.get(ENDPOINT).query(&[
            ("keywords", keyword),
            ("max", max.as_str()),
            ("APIKey", self.api_key.expose_secret()),
        ]);
        let response: FeedResponse = send_json(PROVIDER, request).await?;
        Ok(cause_items(response))
    }
}
