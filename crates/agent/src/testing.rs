//! Mock wiring shared by the pipeline tests. Every mock starts without
//! expectations, so an unexpected provider call fails the test.

use std::sync::Arc;

use wren_core::config::AppConfig;
use wren_core::domain::results::{ListView, Location};
use wren_core::errors::RenderError;

use crate::adapters::{
    MockAnswerEngine, MockCauseFinder, MockDictionary, MockEcoSafety, MockGeocoder, MockImageSearch,
    MockPublishDestination, MockShortenerProvider, MockTweetSearch, MockVideoSearch, FragmentRenderer,
    Providers, PublishDestination,
};

/// Emits predictable markers instead of real templates.
pub(crate) struct MarkerRenderer;

impl FragmentRenderer for MarkerRenderer {
    fn render_list(&self, view: &ListView<'_>) -> Result<String, RenderError> {
        Ok(format!("<section data-{}=\"{}\"></section>", view.resource, view.items.len()))
    }

    fn render_location(&self, location: &Location, _standalone: bool) -> Result<String, RenderError> {
        Ok(format!("<iframe data-address=\"{}\"></iframe>", location.formatted_address))
    }
}

pub(crate) struct ProviderMocks {
    pub images: MockImageSearch,
    pub videos: MockVideoSearch,
    pub tweets: MockTweetSearch,
    pub geocoder: MockGeocoder,
    pub dictionary: MockDictionary,
    pub answers: MockAnswerEngine,
    pub causes: MockCauseFinder,
    pub eco: MockEcoSafety,
    pub destinations: Vec<Arc<dyn PublishDestination>>,
    pub shortener: Option<MockShortenerProvider>,
}

impl ProviderMocks {
    pub fn new() -> Self {
        Self {
            images: MockImageSearch::new(),
            videos: MockVideoSearch::new(),
            tweets: MockTweetSearch::new(),
            geocoder: MockGeocoder::new(),
            dictionary: MockDictionary::new(),
            answers: MockAnswerEngine::new(),
            causes: MockCauseFinder::new(),
            eco: MockEcoSafety::new(),
            destinations: vec![unconfigured_destination()],
            shortener: None,
        }
    }

    /// Adds a configured destination that stores everything under `base`.
    pub fn with_store(mut self, base: &'static str) -> Self {
        let mut destination = MockPublishDestination::new();
        destination.expect_name().return_const("object_store");
        destination.expect_is_configured().return_const(true);
        destination
            .expect_attempt_upload()
            .returning(move |filename, _| Ok(format!("{base}/answer/{filename}")));
        self.destinations = vec![Arc::new(destination)];
        self
    }

    /// Adds a configured shortener that maps every link to `short`.
    pub fn with_shortener(mut self, short: &'static str) -> Self {
        let mut shortener = MockShortenerProvider::new();
        shortener.expect_is_configured().return_const(true);
        shortener.expect_shorten().times(1).returning(move |_| Ok(short.to_string()));
        self.shortener = Some(shortener);
        self
    }

    pub fn into_providers(self) -> Providers {
        let shortener = self.shortener.unwrap_or_else(|| {
            let mut shortener = MockShortenerProvider::new();
            shortener.expect_is_configured().return_const(false);
            shortener
        });
        Providers {
            images: Arc::new(self.images),
            videos: Arc::new(self.videos),
            tweets: Arc::new(self.tweets),
            geocoder: Arc::new(self.geocoder),
            dictionary: Arc::new(self.dictionary),
            answers: Arc::new(self.answers),
            causes: Arc::new(self.causes),
            eco: Arc::new(self.eco),
            destinations: self.destinations,
            shortener: Arc::new(shortener),
            renderer: Arc::new(MarkerRenderer),
        }
    }
}

fn unconfigured_destination() -> Arc<dyn PublishDestination> {
    let mut destination = MockPublishDestination::new();
    destination.expect_name().return_const("object_store");
    destination.expect_is_configured().return_const(false);
    Arc::new(destination)
}

pub(crate) fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.agent.name = "wren".to_string();
    config.agent.maker = "Acme Labs".to_string();
    config.agent.maker_address = "1 Main Street, Springfield".to_string();
    config.agent.maker_url = "https://example.com/acme".to_string();
    config
}
