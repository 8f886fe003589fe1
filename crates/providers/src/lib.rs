//! HTTP adapters for every external service the agent talks to, plus the
//! wiring that turns an [`AppConfig`] into a ready [`Providers`] set.
//!
//! Each adapter makes exactly one attempt per call and maps failures onto
//! [`wren_core::errors::ProviderError`]. Adapters whose credentials are missing
//! are replaced by [`Unconfigured`], so a partially configured deployment still
//! answers everything it can.

pub mod causes;
pub mod eco;
pub mod geo;
pub mod http;
pub mod knowledge;
pub mod media;
pub mod shortener;
pub mod sms;
pub mod storage;
pub mod unconfigured;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::info;
use wren_agent::adapters::{
    ArtifactSource, CauseFinder, Dictionary, FragmentRenderer, Geocoder, ImageSearch, Providers, PublishDestination,
    SmsSender, TweetSearch, VideoSearch,
};
use wren_core::config::AppConfig;

pub use causes::DonorsChooseCauses;
pub use eco::EnvirofactsSafety;
pub use geo::GoogleGeocoder;
pub use knowledge::{DuckDuckGoAnswers, WordnikDictionary};
pub use media::{FlickrImages, TwitterSearch, YoutubeVideos};
pub use shortener::BitlyShortener;
pub use sms::TwilioSms;
pub use storage::{FileShare, ObjectStore};
pub use unconfigured::Unconfigured;

#[derive(Debug, Error)]
pub enum ProviderSetupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The agent's collaborators plus the two services only the HTTP surface uses.
#[derive(Clone)]
pub struct ProviderSet {
    pub providers: Providers,
    pub artifacts: Arc<dyn ArtifactSource>,
    pub sms: Arc<dyn SmsSender>,
}

impl ProviderSet {
    pub fn from_config(
        config: &AppConfig,
        renderer: Arc<dyn FragmentRenderer>,
    ) -> Result<Self, ProviderSetupError> {
        let client = http::build_client(Duration::from_secs(config.providers.timeout_secs))?;
        let keys = &config.providers;

        let images: Arc<dyn ImageSearch> = match present(&keys.flickr_api_key) {
            Some(key) => Arc::new(FlickrImages::new(client.clone(), key)),
            None => Arc::new(Unconfigured::new("flickr")),
        };
        let videos: Arc<dyn VideoSearch> = match present(&keys.youtube_api_key) {
            Some(key) => Arc::new(YoutubeVideos::new(client.clone(), key)),
            None => Arc::new(Unconfigured::new("youtube")),
        };
        let tweets: Arc<dyn TweetSearch> = match present(&keys.twitter_bearer_token) {
            Some(token) => Arc::new(TwitterSearch::new(client.clone(), token)),
            None => Arc::new(Unconfigured::new("twitter")),
        };
        let geocoder: Arc<dyn Geocoder> = match present(&keys.geocoding_api_key) {
            Some(key) => Arc::new(GoogleGeocoder::new(client.clone(), key)),
            None => Arc::new(Unconfigured::new("google_geocoding")),
        };
        let dictionary: Arc<dyn Dictionary> = match present(&keys.wordnik_api_key) {
            Some(key) => Arc::new(WordnikDictionary::new(client.clone(), key)),
            None => Arc::new(Unconfigured::new("wordnik")),
        };
        let causes: Arc<dyn CauseFinder> = match present(&keys.donorschoose_api_key) {
            Some(key) => Arc::new(DonorsChooseCauses::new(client.clone(), key)),
            None => Arc::new(Unconfigured::new("donorschoose")),
        };

        let object_store =
            Arc::new(ObjectStore::new(client.clone(), &config.storage.object_store, &config.agent.public_base_url));
        let file_share = Arc::new(FileShare::new(client.clone(), &config.storage.file_share));
        let destinations: Vec<Arc<dyn PublishDestination>> =
            vec![object_store.clone() as Arc<dyn PublishDestination>, file_share as Arc<dyn PublishDestination>];

        info!(
            event_name = "providers.wired",
            destinations = destinations.iter().filter(|destination| destination.is_configured()).count(),
            shortener = config.shortener.is_configured(),
            sms = config.sms.is_configured(),
            "providers wired"
        );

        Ok(Self {
            providers: Providers {
                images,
                videos,
                tweets,
                geocoder,
                dictionary,
                answers: Arc::new(DuckDuckGoAnswers::new(client.clone(), keys.answers_base_url.clone())),
                causes,
                eco: Arc::new(EnvirofactsSafety::new(client.clone(), keys.eco_base_url.clone())),
                destinations,
                shortener: Arc::new(BitlyShortener::new(client.clone(), &config.shortener)),
                renderer,
            },
            artifacts: object_store,
            sms: Arc::new(TwilioSms::new(client, &config.sms)),
        })
    }
}

/// A key counts only when it is present and not blank.
fn present(key: &Option<SecretString>) -> Option<SecretString> {
    key.as_ref().filter(|key| !key.expose_secret().trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use wren_agent::adapters::{FragmentRenderer, ImageSearch, PublishDestination, ShortenerProvider, SmsSender};
    use wren_core::config::AppConfig;
    use wren_core::domain::results::{ListView, Location};
    use wren_core::errors::{ProviderError, RenderError};

    use super::{present, ProviderSet};

    struct BlankRenderer;

    impl FragmentRenderer for BlankRenderer {
        fn render_list(&self, _view: &ListView<'_>) -> Result<String, RenderError> {
            Ok(String::new())
        }

        fn render_location(&self, _location: &Location, _standalone: bool) -> Result<String, RenderError> {
            Ok(String::new())
        }
    }

    #[test]
    fn blank_keys_are_treated_as_missing() {
        assert!(present(&None).is_none());
        assert!(present(&Some(SecretString::from("  ".to_string()))).is_none());
        assert!(present(&Some(SecretString::from("key".to_string()))).is_some());
    }

    #[tokio::test]
    async fn default_config_wires_unconfigured_stand_ins() {
        let set = match ProviderSet::from_config(&AppConfig::default(), Arc::new(BlankRenderer)) {
            Ok(set) => set,
            Err(error) => panic!("wiring should succeed: {error}"),
        };
        let error = set.providers.images.search("cats", 3).await.err();
        assert!(matches!(error, Some(ProviderError::Unsupported { ref provider, .. }) if provider == "flickr"));
        assert_eq!(
            set.providers.destinations.iter().map(|destination| destination.name()).collect::<Vec<_>>(),
            vec!["object_store", "file_share"]
        );
        assert!(!set.providers.shortener.is_configured());
        assert!(!set.sms.is_configured());
    }
}
