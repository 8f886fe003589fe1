use serde::{Deserialize, Serialize};

use crate::domain::limit::Limit;
use crate::domain::resource::ResourceType;

/// Where a location or safety lookup should point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `"lat,lon"`, the form geocoders accept as an address.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Classified purpose of an utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    ImageSearch { subject: String, limit: Limit },
    VideoSearch { subject: String, limit: Limit },
    TweetSearch { subject: String, limit: Limit },
    CauseSearch { keyword: String },
    SafetyCheck { subject: String },
    LocationSearch { subject: String, uncertain: bool },
    Definition { subject: String },
    GeneralAnswer { subject: String },
    Game { move_name: String },
    Greeting,
    Help,
    Error { detail: Option<String> },
    RandomFallback { subject: String, limit: Limit },
}

impl Intent {
    pub fn media_search(resource: ResourceType, subject: String, limit: Limit) -> Option<Self> {
        match resource {
            ResourceType::Image => Some(Self::ImageSearch { subject, limit }),
            ResourceType::Video => Some(Self::VideoSearch { subject, limit }),
            ResourceType::Tweet => Some(Self::TweetSearch { subject, limit }),
            ResourceType::Cause => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageSearch { .. } => "image_search",
            Self::VideoSearch { .. } => "video_search",
            Self::TweetSearch { .. } => "tweet_search",
            Self::CauseSearch { .. } => "cause_search",
            Self::SafetyCheck { .. } => "safety_check",
            Self::LocationSearch { .. } => "location_search",
            Self::Definition { .. } => "definition",
            Self::GeneralAnswer { .. } => "general_answer",
            Self::Game { .. } => "game",
            Self::Greeting => "greeting",
            Self::Help => "help",
            Self::Error { .. } => "error",
            Self::RandomFallback { .. } => "random_fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinates, Intent};
    use crate::domain::{limit::Limit, resource::ResourceType};

    #[test]
    fn media_search_maps_each_searchable_type() {
        let intent = Intent::media_search(ResourceType::Video, "cats".to_string(), Limit::Count(3));
        assert_eq!(
            intent,
            Some(Intent::VideoSearch { subject: "cats".to_string(), limit: Limit::Count(3) })
        );
        assert!(Intent::media_search(ResourceType::Cause, "x".to_string(), Limit::Unset).is_none());
    }

    #[test]
    fn coordinates_render_as_geocoder_query() {
        assert_eq!(Coordinates::new(40.7, -74.0).as_query(), "40.7,-74");
    }
}
