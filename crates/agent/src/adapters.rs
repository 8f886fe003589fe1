//! Boundaries to external services. Each call is a single attempt; any error
//! comes back as a [`ProviderError`] and the caller decides what to say.

use std::sync::Arc;

use async_trait::async_trait;
use wren_core::domain::results::{
    AnswerResponse, CauseItem, Definition, GeocodeOutcome, ImageItem, ListView, Location, SafetyArea,
    SafetyReport, TweetItem, VideoItem,
};
use wren_core::errors::{ProviderError, RenderError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, subject: &str, limit: u32) -> Result<Vec<ImageItem>, ProviderError>;
}

/// Video lookups take two calls: matching ids first, then details for those ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_ids(&self, subject: &str, limit: u32) -> Result<Vec<String>, ProviderError>;
    async fn details(&self, ids: &[String]) -> Result<Vec<VideoItem>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TweetSearch: Send + Sync {
    async fn search(&self, subject: &str, limit: u32) -> Result<Vec<TweetItem>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodeOutcome, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dictionary: Send + Sync {
    /// At most one definition; an empty list means the word is unknown.
    async fn define(&self, word: &str) -> Result<Vec<Definition>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn query(&self, text: &str) -> Result<AnswerResponse, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CauseFinder: Send + Sync {
    async fn search_causes(&self, keyword: &str, limit: u32) -> Result<Vec<CauseItem>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EcoSafety: Send + Sync {
    async fn report(&self, area: &SafetyArea) -> Result<SafetyReport, ProviderError>;
}

/// One place a rendered artifact can be stored and served from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishDestination: Send + Sync {
    fn name(&self) -> &'static str;

    /// Unconfigured destinations are skipped without an attempt.
    fn is_configured(&self) -> bool;

    /// Stores the artifact and returns its public, unshortened URL.
    async fn attempt_upload(&self, filename: &str, content: &[u8]) -> Result<String, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortenerProvider: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn shorten(&self, url: &str) -> Result<String, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn send_message(&self, to: &str, body: &str) -> Result<(), ProviderError>;
}

/// Read side of the primary store, backing the artifact retrieval endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, ProviderError>;
}

/// Turns result data into markup. Implementations escape every field.
pub trait FragmentRenderer: Send + Sync {
    fn render_list(&self, view: &ListView<'_>) -> Result<String, RenderError>;
    fn render_location(&self, location: &Location, standalone: bool) -> Result<String, RenderError>;
}

/// Every collaborator one agent talks to.
#[derive(Clone)]
pub struct Providers {
    pub images: Arc<dyn ImageSearch>,
    pub videos: Arc<dyn VideoSearch>,
    pub tweets: Arc<dyn TweetSearch>,
    pub geocoder: Arc<dyn Geocoder>,
    pub dictionary: Arc<dyn Dictionary>,
    pub answers: Arc<dyn AnswerEngine>,
    pub causes: Arc<dyn CauseFinder>,
    pub eco: Arc<dyn EcoSafety>,
    pub destinations: Vec<Arc<dyn PublishDestination>>,
    pub shortener: Arc<dyn ShortenerProvider>,
    pub renderer: Arc<dyn FragmentRenderer>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("destinations", &self.destinations.iter().map(|d| d.name()).collect::<Vec<_>>())
            .field("shortener_configured", &self.shortener.is_configured())
            .finish_non_exhaustive()
    }
}
