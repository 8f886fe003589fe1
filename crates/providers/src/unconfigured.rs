use async_trait::async_trait;
use wren_agent::adapters::{CauseFinder, Dictionary, Geocoder, ImageSearch, TweetSearch, VideoSearch};
use wren_core::domain::results::{CauseItem, Definition, GeocodeOutcome, ImageItem, TweetItem, VideoItem};
use wren_core::errors::ProviderError;

/// Stands in for a provider whose credentials are missing. Every call fails
/// with [`ProviderError::Unsupported`], which the agent turns into an apology.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured {
    provider: &'static str,
}

impl Unconfigured {
    pub fn new(provider: &'static str) -> Self {
        Self { provider }
    }

    fn refuse<T>(&self, operation: &str) -> Result<T, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.provider.to_string(),
            operation: format!("{operation} (no credentials configured)"),
        })
    }
}

#[async_trait]
impl ImageSearch for Unconfigured {
    async fn search(&self, _subject: &str, _limit: u32) -> Result<Vec<ImageItem>, ProviderError> {
        self.refuse("image search")
    }
}

#[async_trait]
impl VideoSearch for Unconfigured {
    async fn search_ids(&self, _subject: &str, _limit: u32) -> Result<Vec<String>, ProviderError> {
        self.refuse("video search")
    }

    async fn details(&self, _ids: &[String]) -> Result<Vec<VideoItem>, ProviderError> {
        self.refuse("video details")
    }
}

#[async_trait]
impl TweetSearch for Unconfigured {
    async fn search(&self, _subject: &str, _limit: u32) -> Result<Vec<TweetItem>, ProviderError> {
        self.refuse("tweet search")
    }
}

#[async_trait]
impl Geocoder for Unconfigured {
    async fn geocode(&self, _address: &str) -> Result<GeocodeOutcome, ProviderError> {
        self.refuse("geocode")
    }
}

#[async_trait]
impl Dictionary for Unconfigured {
    async fn define(&self, _word: &str) -> Result<Vec<Definition>, ProviderError> {
        self.refuse("define")
    }
}

#[async_trait]
impl CauseFinder for Unconfigured {
    async fn search_causes(&self, _keyword: &str, _limit: u32) -> Result<Vec<CauseItem>, ProviderError> {
        self.refuse("cause search")
    }
}

#[cfg(test)]
mod tests {
    use wren_agent::adapters::{Dictionary, ImageSearch};
    use wren_core::errors::ProviderError;

    use super::Unconfigured;

    #[tokio::test]
    async fn every_call_is_refused_with_the_provider_name() {
        let flickr = Unconfigured::new("flickr");
        let error = ImageSearch::search(&flickr, "cats", 5).await.err();
        assert!(matches!(error, Some(ProviderError::Unsupported { ref provider, .. }) if provider == "flickr"));
        assert!(flickr.define("cat").await.is_err());
    }
}
