use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceType;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub thumbnail_url: String,
    pub page_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail_url: String,
    pub published_at: Option<String>,
    /// ISO-8601 duration as reported by the provider, e.g. `PT4M13S`.
    pub duration: Option<String>,
    pub view_count: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetItem {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseItem {
    pub title: String,
    pub school_name: String,
    pub grade_level: String,
    pub proposal_url: String,
    pub image_url: String,
}

/// Items of one list result, tagged with their resource type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ResultItems {
    Images(Vec<ImageItem>),
    Videos(Vec<VideoItem>),
    Tweets(Vec<TweetItem>),
    Causes(Vec<CauseItem>),
}

impl ResultItems {
    pub fn resource(&self) -> ResourceType {
        match self {
            Self::Images(_) => ResourceType::Image,
            Self::Videos(_) => ResourceType::Video,
            Self::Tweets(_) => ResourceType::Tweet,
            Self::Causes(_) => ResourceType::Cause,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Images(items) => items.len(),
            Self::Videos(items) => items.len(),
            Self::Tweets(items) => items.len(),
            Self::Causes(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a fragment template needs to render a result list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListView<'a> {
    pub resource: ResourceType,
    pub subject: &'a str,
    pub items: &'a ResultItems,
    /// Standalone documents are published out-of-band; fragments are embedded inline.
    pub standalone: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub formatted_address: String,
    pub short_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub postal_code: Option<String>,
}

const MAX_DISPLAY_NAME_CHARS: usize = 80;

impl Location {
    /// Long formatted addresses read badly in a chat line; fall back to the short name.
    pub fn display_name(&self) -> &str {
        if self.formatted_address.chars().count() > MAX_DISPLAY_NAME_CHARS {
            if let Some(short_name) = self.short_name.as_deref().filter(|name| !name.is_empty()) {
                return short_name;
            }
        }
        &self.formatted_address
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GeocodeOutcome {
    Found(Location),
    NotFound { status: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub word: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub abstract_text: String,
    pub heading: String,
    pub redirect_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub releases: Vec<NaiveDate>,
}

impl Facility {
    pub fn released_since(&self, cutoff: NaiveDate) -> bool {
        self.releases.iter().any(|date| *date >= cutoff)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub facilities: Vec<Facility>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SafetyArea {
    Zip(String),
    Coordinates { latitude: f64, longitude: f64 },
}
