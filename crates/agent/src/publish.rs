use std::sync::Arc;

use tracing::{debug, warn};
use wren_core::errors::PublishError;

use crate::adapters::{PublishDestination, ShortenerProvider};

/// Best-effort URL shortening. Any failure yields the input unchanged.
#[derive(Clone)]
pub struct LinkShortener {
    provider: Arc<dyn ShortenerProvider>,
}

impl LinkShortener {
    pub fn new(provider: Arc<dyn ShortenerProvider>) -> Self {
        Self { provider }
    }

    pub async fn shorten(&self, url: &str) -> String {
        if !self.provider.is_configured() {
            return url.to_string();
        }

        match self.provider.shorten(url).await {
            Ok(short) if !short.trim().is_empty() => short.trim().to_string(),
            Ok(_) => {
                warn!(event_name = "publish.shortener.empty", "shortener returned an empty link");
                url.to_string()
            }
            Err(error) => {
                warn!(
                    event_name = "publish.shortener.failed",
                    provider = error.provider(),
                    error = %error,
                    "falling back to the unshortened link"
                );
                url.to_string()
            }
        }
    }
}

/// Ordered destinations, each tried at most once; the first upload that
/// succeeds wins and its link is shortened.
#[derive(Clone)]
pub struct ArtifactPublisher {
    destinations: Vec<Arc<dyn PublishDestination>>,
    shortener: LinkShortener,
}

impl ArtifactPublisher {
    pub fn new(destinations: Vec<Arc<dyn PublishDestination>>, shortener: LinkShortener) -> Self {
        Self { destinations, shortener }
    }

    pub async fn publish(&self, filename: &str, content: &[u8]) -> Result<String, PublishError> {
        let mut attempts = 0;

        for destination in &self.destinations {
            if !destination.is_configured() {
                debug!(
                    event_name = "publish.destination.skipped",
                    destination = destination.name(),
                    "destination not configured"
                );
                continue;
            }

            attempts += 1;
            match destination.attempt_upload(filename, content).await {
                Ok(url) => {
                    debug!(
                        event_name = "publish.destination.stored",
                        destination = destination.name(),
                        filename,
                        "artifact stored"
                    );
                    return Ok(self.shortener.shorten(&url).await);
                }
                Err(error) => {
                    warn!(
                        event_name = "publish.destination.failed",
                        destination = destination.name(),
                        filename,
                        error = %error,
                        "trying next destination"
                    );
                }
            }
        }

        if attempts == 0 {
            Err(PublishError::NoDestination)
        } else {
            Err(PublishError::Exhausted { attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;
    use wren_core::errors::{ProviderError, PublishError};

    use super::{ArtifactPublisher, LinkShortener};
    use crate::adapters::{MockPublishDestination, MockShortenerProvider, PublishDestination};

    fn unconfigured_shortener() -> LinkShortener {
        let mut provider = MockShortenerProvider::new();
        provider.expect_is_configured().return_const(false);
        provider.expect_shorten().never();
        LinkShortener::new(Arc::new(provider))
    }

    fn destination(
        name: &'static str,
        configured: bool,
        outcome: Option<Result<String, ProviderError>>,
    ) -> Arc<dyn PublishDestination> {
        let mut destination = MockPublishDestination::new();
        destination.expect_name().return_const(name);
        destination.expect_is_configured().return_const(configured);
        match outcome {
            Some(result) => {
                destination.expect_attempt_upload().times(1).return_once(move |_, _| result);
            }
            None => {
                destination.expect_attempt_upload().never();
            }
        }
        Arc::new(destination)
    }

    #[tokio::test]
    async fn shortener_returns_input_when_unconfigured() {
        let url = "https://example.com/a?b=c&d=%20";
        assert_eq!(unconfigured_shortener().shorten(url).await, url);
    }

    #[tokio::test]
    async fn shortener_returns_input_when_provider_fails() {
        let mut provider = MockShortenerProvider::new();
        provider.expect_is_configured().return_const(true);
        provider
            .expect_shorten()
            .with(eq("https://example.com/long"))
            .times(1)
            .returning(|_| Err(ProviderError::Timeout { provider: "bitly".to_string() }));
        let shortener = LinkShortener::new(Arc::new(provider));
        assert_eq!(shortener.shorten("https://example.com/long").await, "https://example.com/long");
    }

    #[tokio::test]
    async fn shortener_uses_provider_result() {
        let mut provider = MockShortenerProvider::new();
        provider.expect_is_configured().return_const(true);
        provider.expect_shorten().returning(|_| Ok("https://sho.rt/x\n".to_string()));
        let shortener = LinkShortener::new(Arc::new(provider));
        assert_eq!(shortener.shorten("https://example.com/long").await, "https://sho.rt/x");
    }

    #[tokio::test]
    async fn first_successful_destination_wins() {
        let publisher = ArtifactPublisher::new(
            vec![
                destination("object_store", true, Some(Ok("https://wren.test/answer/a.html".to_string()))),
                destination("file_share", true, None),
            ],
            unconfigured_shortener(),
        );
        assert_eq!(publisher.publish("a.html", b"<p>hi</p>").await, Ok("https://wren.test/answer/a.html".to_string()));
    }

    #[tokio::test]
    async fn failed_destination_falls_through_once() {
        let publisher = ArtifactPublisher::new(
            vec![
                destination(
                    "object_store",
                    true,
                    Some(Err(ProviderError::Status {
                        provider: "s3".to_string(),
                        status: 403,
                        message: "denied".to_string(),
                    })),
                ),
                destination("file_share", true, Some(Ok("https://dl.example.com/a.html".to_string()))),
            ],
            unconfigured_shortener(),
        );
        assert_eq!(publisher.publish("a.html", b"x").await, Ok("https://dl.example.com/a.html".to_string()));
    }

    #[tokio::test]
    async fn unconfigured_destinations_are_skipped() {
        let publisher = ArtifactPublisher::new(
            vec![destination("object_store", false, None), destination("file_share", false, None)],
            unconfigured_shortener(),
        );
        assert_eq!(publisher.publish("a.html", b"x").await, Err(PublishError::NoDestination));
    }

    #[tokio::test]
    async fn exhausted_chain_reports_attempts() {
        let publisher = ArtifactPublisher::new(
            vec![
                destination("object_store", false, None),
                destination(
                    "file_share",
                    true,
                    Some(Err(ProviderError::Transport {
                        provider: "dropbox".to_string(),
                        message: "reset".to_string(),
                    })),
                ),
            ],
            unconfigured_shortener(),
        );
        assert_eq!(publisher.publish("a.html", b"x").await, Err(PublishError::Exhausted { attempts: 1 }));
    }
}
