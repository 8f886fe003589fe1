use serde::{Deserialize, Serialize};

use crate::domain::channel::Channel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Image,
    Video,
    Tweet,
    Cause,
}

const IMAGE_SYNONYMS: &[&str] = &["image", "photo", "picture"];
const VIDEO_SYNONYMS: &[&str] = &["video", "movie", "film"];
const TWEET_SYNONYMS: &[&str] = &["tweet", "twitter", "toot"];
const CAUSE_SYNONYMS: &[&str] = &["worthy cause"];

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [Self::Image, Self::Video, Self::Tweet, Self::Cause];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Tweet => "tweet",
            Self::Cause => "cause",
        }
    }

    /// Singular, lowercase nouns; used both for matching and for reply wording.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_SYNONYMS,
            Self::Video => VIDEO_SYNONYMS,
            Self::Tweet => TWEET_SYNONYMS,
            Self::Cause => CAUSE_SYNONYMS,
        }
    }

    /// Media types can be requested by name ("pictures of cats").
    pub fn is_searchable_by_name(&self) -> bool {
        !matches!(self, Self::Cause)
    }

    /// Whether result summaries mention the search subject ("5 cat pictures").
    pub fn mentions_subject(&self) -> bool {
        !matches!(self, Self::Cause)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types available on one channel.
///
/// Tweets may only be shown inline, never stored for out-of-band delivery, so
/// they are absent from the registry of every channel except web.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRegistry {
    types: Vec<ResourceType>,
}

impl ResourceRegistry {
    pub fn for_channel(channel: Channel) -> Self {
        let types = ResourceType::ALL
            .into_iter()
            .filter(|resource| channel.renders_inline() || *resource != ResourceType::Tweet)
            .collect();
        Self { types }
    }

    pub fn contains(&self, resource: ResourceType) -> bool {
        self.types.contains(&resource)
    }

    pub fn types(&self) -> &[ResourceType] {
        &self.types
    }

    pub fn searchable(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.types.iter().copied().filter(ResourceType::is_searchable_by_name)
    }

    /// Resolves a (possibly plural, any case) noun to its resource type.
    pub fn resolve(&self, noun: &str) -> Option<ResourceType> {
        let lowered = noun.trim().to_lowercase();
        let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
        self.searchable().find(|resource| {
            resource.synonyms().iter().any(|synonym| *synonym == lowered || *synonym == singular)
        })
    }
}
