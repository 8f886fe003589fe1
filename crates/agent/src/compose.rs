//! Response assembly: the ordered message list of one request plus the
//! list-rendering routine shared by every result-list intent.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;
use wren_core::domain::message::{escape_markup, Message, Reply};
use wren_core::domain::resource::ResourceType;
use wren_core::domain::results::{ListView, ResultItems};
use wren_core::random::{pick, Chooser};
use wren_core::Channel;

use crate::adapters::FragmentRenderer;
use crate::persona::Persona;
use crate::phrases::{found_some, phrase, PhraseCategory};
use crate::publish::ArtifactPublisher;

/// Messages queued for one request, in send order.
#[derive(Clone, Debug)]
pub struct Composer {
    channel: Channel,
    messages: Vec<Message>,
    share_suggestion: Option<String>,
}

impl Composer {
    pub fn new(channel: Channel) -> Self {
        Self { channel, messages: Vec::new(), share_suggestion: None }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Queues text; it is escaped on the way out.
    pub fn say(&mut self, text: impl Into<String>) {
        self.messages.push(Message::Escaped(text.into()));
    }

    /// Queues trusted markup built by this application.
    pub fn say_raw(&mut self, markup: impl Into<String>) {
        self.messages.push(Message::Raw(markup.into()));
    }

    /// Records a share suggestion, escaped like any other text. Web only;
    /// the first suggestion of a request sticks.
    pub fn share(&mut self, text: impl Into<String>) {
        if self.channel.supports_share_suggestion() && self.share_suggestion.is_none() {
            self.share_suggestion = Some(escape_markup(&text.into()));
        }
    }

    /// Puts `text` in front of the reply: it replaces the primary answer on
    /// web and is added before it elsewhere.
    pub fn preface(&mut self, text: impl Into<String>) {
        let message = Message::Escaped(text.into());
        match self.messages.first_mut() {
            Some(primary) if self.channel.renders_inline() => *primary = message,
            _ => self.messages.insert(0, message),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn finish(self) -> Reply {
        Reply {
            messages: self.messages.iter().map(Message::to_wire).collect(),
            share_suggestion: self.share_suggestion,
        }
    }
}

/// One of the type's synonyms, pluralized with a bare "s" unless `count == 1`.
pub fn type_noun(chooser: &mut dyn Chooser, resource: ResourceType, count: usize) -> String {
    let noun = pick(chooser, resource.synonyms()).copied().unwrap_or_else(|| resource.as_str());
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

/// Standard apology, optionally followed by detail.
pub fn apologize(composer: &mut Composer, chooser: &mut dyn Chooser, detail: Option<String>) {
    composer.say(phrase(chooser, PhraseCategory::Error));
    if let Some(detail) = detail.filter(|text| !text.trim().is_empty()) {
        composer.say(detail);
    }
}

/// Renders result lists inline on web and as published artifacts elsewhere.
#[derive(Clone)]
pub struct ListPresenter {
    persona: Persona,
    renderer: Arc<dyn FragmentRenderer>,
    publisher: ArtifactPublisher,
}

impl ListPresenter {
    pub fn new(persona: Persona, renderer: Arc<dyn FragmentRenderer>, publisher: ArtifactPublisher) -> Self {
        Self { persona, renderer, publisher }
    }

    pub async fn present(
        &self,
        composer: &mut Composer,
        chooser: &mut dyn Chooser,
        subject: &str,
        items: &ResultItems,
    ) {
        let resource = items.resource();
        let count = items.len();
        let noun = type_noun(chooser, resource, count);
        let described = if resource.mentions_subject() { format!("{subject} {noun}") } else { noun.clone() };

        if items.is_empty() {
            let none = phrase(chooser, PhraseCategory::FoundNone);
            composer.say(format!("{none} {described}."));
            return;
        }

        let standalone = !composer.channel().renders_inline();
        let view = ListView { resource, subject, items, standalone };
        let markup = match self.renderer.render_list(&view) {
            Ok(markup) => markup,
            Err(render_error) => {
                error!(
                    event_name = "agent.compose.render_failed",
                    resource = resource.as_str(),
                    error = %render_error,
                    "result list could not be rendered"
                );
                apologize(composer, chooser, None);
                return;
            }
        };

        if standalone {
            let filename = artifact_filename(&self.persona.name, &noun);
            match self.publisher.publish(&filename, markup.as_bytes()).await {
                Ok(url) => {
                    let found = found_some(chooser);
                    composer.say(format!("{found} {count} {described}: {url}"));
                }
                Err(publish_error) => {
                    error!(
                        event_name = "agent.compose.publish_failed",
                        resource = resource.as_str(),
                        filename = %filename,
                        error = %publish_error,
                        "result list could not be published"
                    );
                    apologize(composer, chooser, None);
                }
            }
            return;
        }

        let share = match resource {
            ResourceType::Cause => format!("found me {count} {described}"),
            _ => format!("fetched {count} {described}"),
        };
        composer.share(self.persona.share_text(&share));
        let found = found_some(chooser);
        composer.say(format!("{found} {count} {described}:"));
        composer.say_raw(markup);
    }
}

/// `<agent>-<noun>-<uuid>.html`. Both parts are slugged down to ASCII
/// letters and digits joined by dashes so the name is always URL-safe.
pub fn artifact_filename(agent: &str, noun: &str) -> String {
    format!("{}-{}-{}.html", slug(agent), slug(noun), Uuid::new_v4())
}

fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use wren_core::domain::message::Message;
    use wren_core::domain::resource::ResourceType;
    use wren_core::domain::results::{ImageItem, ListView, Location, ResultItems, VideoItem};
    use wren_core::errors::RenderError;
    use wren_core::random::{FirstChoice, ScriptedChoice};
    use wren_core::Channel;

    use super::{artifact_filename, type_noun, Composer, ListPresenter};
    use crate::adapters::{
        FragmentRenderer, MockPublishDestination, MockShortenerProvider, PublishDestination,
    };
    use crate::persona::Persona;
    use crate::publish::{ArtifactPublisher, LinkShortener};

    /// Renders a fixed marker and remembers every view it was asked for.
    #[derive(Default)]
    struct RecordingRenderer {
        standalone: Mutex<Vec<bool>>,
    }

    impl FragmentRenderer for RecordingRenderer {
        fn render_list(&self, view: &ListView<'_>) -> Result<String, RenderError> {
            if let Ok(mut seen) = self.standalone.lock() {
                seen.push(view.standalone);
            }
            Ok(format!("<ul data-count=\"{}\"></ul>", view.items.len()))
        }

        fn render_location(&self, _location: &Location, _standalone: bool) -> Result<String, RenderError> {
            Ok("<iframe></iframe>".to_string())
        }
    }

    fn persona() -> Persona {
        Persona {
            name: "wren".to_string(),
            display_name: "Wren".to_string(),
            maker: "Acme Labs".to_string(),
            maker_url: "https://example.com".to_string(),
        }
    }

    fn shortener() -> LinkShortener {
        let mut provider = MockShortenerProvider::new();
        provider.expect_is_configured().return_const(false);
        LinkShortener::new(Arc::new(provider))
    }

    fn destination(configured: bool, calls: usize) -> Arc<dyn PublishDestination> {
        let mut destination = MockPublishDestination::new();
        destination.expect_name().return_const("object_store");
        destination.expect_is_configured().return_const(configured);
        destination
            .expect_attempt_upload()
            .times(calls)
            .returning(|filename, _| Ok(format!("https://wren.test/answer/{filename}")));
        Arc::new(destination)
    }

    fn presenter(renderer: Arc<RecordingRenderer>, destinations: Vec<Arc<dyn PublishDestination>>) -> ListPresenter {
        ListPresenter::new(persona(), renderer, ArtifactPublisher::new(destinations, shortener()))
    }

    fn images(count: usize) -> ResultItems {
        ResultItems::Images(
            (0..count)
                .map(|index| ImageItem {
                    id: index.to_string(),
                    title: format!("cat {index}"),
                    owner: "owner".to_string(),
                    thumbnail_url: "https://img.test/t.jpg".to_string(),
                    page_url: "https://img.test/p".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn escaped_and_raw_messages_keep_order() {
        let mut composer = Composer::new(Channel::Web);
        composer.say("Tom & Jerry");
        composer.say_raw("<b>ok</b>");
        let reply = composer.finish();
        assert_eq!(reply.messages, vec!["Tom &amp; Jerry".to_string(), "<b>ok</b>".to_string()]);
    }

    #[test]
    fn share_is_web_only_and_set_once() {
        let mut web = Composer::new(Channel::Web);
        web.share("first");
        web.share("second");
        assert_eq!(web.finish().share_suggestion, Some("first".to_string()));

        let mut sms = Composer::new(Channel::Sms);
        sms.share("first");
        assert_eq!(sms.finish().share_suggestion, None);
    }

    #[test]
    fn preface_replaces_on_web_and_prepends_elsewhere() {
        let mut web = Composer::new(Channel::Web);
        web.say("found it");
        web.say_raw("<map>");
        web.preface("not sure");
        assert_eq!(web.messages(), &[Message::Escaped("not sure".to_string()), Message::Raw("<map>".to_string())]);

        let mut sms = Composer::new(Channel::Sms);
        sms.say("found it");
        sms.preface("not sure");
        assert_eq!(sms.messages().len(), 2);
        assert_eq!(sms.messages()[0], Message::Escaped("not sure".to_string()));
    }

    #[test]
    fn type_noun_pluralizes_unless_single() {
        assert_eq!(type_noun(&mut FirstChoice, ResourceType::Video, 5), "videos");
        assert_eq!(type_noun(&mut ScriptedChoice::new([2]), ResourceType::Image, 1), "picture");
        assert_eq!(type_noun(&mut FirstChoice, ResourceType::Cause, 0), "worthy causes");
    }

    #[tokio::test]
    async fn empty_results_apologize_without_publishing() {
        let renderer = Arc::new(RecordingRenderer::default());
        let presenter = presenter(renderer.clone(), vec![destination(true, 0)]);
        let mut composer = Composer::new(Channel::Sms);
        presenter.present(&mut composer, &mut FirstChoice, "unicorns", &images(0)).await;

        let reply = composer.finish();
        assert_eq!(reply.messages, vec!["Sorry, I couldn&#039;t find any unicorns images.".to_string()]);
        assert!(renderer.standalone.lock().map(|seen| seen.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn web_results_are_inline_with_share_suggestion() {
        let renderer = Arc::new(RecordingRenderer::default());
        let presenter = presenter(renderer.clone(), vec![destination(true, 0)]);
        let mut composer = Composer::new(Channel::Web);
        let videos = ResultItems::Videos(vec![
            VideoItem {
                id: "a".to_string(),
                title: "A".to_string(),
                channel_title: "c".to_string(),
                thumbnail_url: "https://v.test/a.jpg".to_string(),
                published_at: None,
                duration: None,
                view_count: None,
            };
            5
        ]);
        presenter.present(&mut composer, &mut FirstChoice, "quadrocopters", &videos).await;

        let reply = composer.finish();
        assert_eq!(
            reply.messages,
            vec![
                "Good news! I found 5 quadrocopters videos:".to_string(),
                "<ul data-count=\"5\"></ul>".to_string(),
            ]
        );
        assert_eq!(
            reply.share_suggestion.as_deref(),
            Some("Wren just fetched 5 quadrocopters videos for me. Ask Wren anything!")
        );
        assert_eq!(renderer.standalone.lock().map(|seen| seen.clone()).unwrap_or_default(), vec![false]);
    }

    #[tokio::test]
    async fn markup_in_the_subject_is_escaped_in_the_share_suggestion() {
        let renderer = Arc::new(RecordingRenderer::default());
        let presenter = presenter(renderer, vec![destination(true, 0)]);
        let mut composer = Composer::new(Channel::Web);
        presenter.present(&mut composer, &mut FirstChoice, "<img src=x onerror=alert(1)>", &images(2)).await;

        let reply = composer.finish();
        assert_eq!(reply.messages[0], "Good news! I found 2 &lt;img src=x onerror=alert(1)&gt; images:");
        assert_eq!(
            reply.share_suggestion.as_deref(),
            Some("Wren just fetched 2 &lt;img src=x onerror=alert(1)&gt; images for me. Ask Wren anything!")
        );
    }

    #[tokio::test]
    async fn other_channels_publish_a_standalone_document() {
        let renderer = Arc::new(RecordingRenderer::default());
        let presenter = presenter(renderer.clone(), vec![destination(true, 1)]);
        let mut composer = Composer::new(Channel::Voice);
        presenter.present(&mut composer, &mut FirstChoice, "cats", &images(2)).await;

        let reply = composer.finish();
        assert_eq!(reply.messages.len(), 1);
        assert!(reply.messages[0].starts_with("Good news! I found 2 cats images: https://wren.test/answer/wren-images-"));
        assert!(reply.messages[0].ends_with(".html"));
        assert_eq!(reply.share_suggestion, None);
        assert_eq!(renderer.standalone.lock().map(|seen| seen.clone()).unwrap_or_default(), vec![true]);
    }

    #[tokio::test]
    async fn missing_destinations_yield_one_generic_error() {
        let renderer = Arc::new(RecordingRenderer::default());
        let presenter = presenter(renderer, vec![destination(false, 0)]);
        let mut composer = Composer::new(Channel::Sms);
        presenter.present(&mut composer, &mut FirstChoice, "cats", &images(3)).await;

        let reply = composer.finish();
        assert_eq!(reply.messages, vec!["Sorry, something went wrong!".to_string()]);
    }

    #[test]
    fn artifact_names_are_unique_and_slugged() {
        let first = artifact_filename("wren", "worthy causes");
        let second = artifact_filename("wren", "worthy causes");
        assert!(first.starts_with("wren-worthy-causes-"));
        assert!(first.ends_with(".html"));
        assert_ne!(first, second);
    }
}
