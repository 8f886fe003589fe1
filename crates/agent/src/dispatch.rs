//! Intent handlers. Each provider failure is caught here, logged once and
//! turned into an apology; it never reaches the caller or re-enters the cascade.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::error;
use url::form_urlencoded;
use wren_core::config::LimitsConfig;
use wren_core::domain::intent::Intent;
use wren_core::domain::message::escape_markup;
use wren_core::domain::results::{GeocodeOutcome, ResultItems, SafetyArea, SafetyReport};
use wren_core::random::{pick_of, Chooser};

use crate::adapters::{
    AnswerEngine, CauseFinder, Dictionary, EcoSafety, FragmentRenderer, Geocoder, ImageSearch, Providers,
    TweetSearch, VideoSearch,
};
use crate::cascade::{resolve_fallback, Shortcut, DEFAULT_CAUSE_KEYWORD};
use crate::compose::{apologize, Composer, ListPresenter};
use crate::error::{DispatchError, DuringOperation};
use crate::persona::{capitalize, Persona};
use crate::phrases::{found_some, phrase, PhraseCategory};
use crate::publish::{ArtifactPublisher, LinkShortener};
use crate::suggestions::SuggestionGenerator;

const MAPS_BASE_URL: &str = "https://maps.google.com/maps";
const ENVIROFACTS_URL: &str = "https://iaspub.epa.gov/enviro/find.html";
const WORDNIK_WORD_URL: &str = "https://wordnik.com/words/";
const UNCERTAIN_LOCATION_PREFACE: &str = "I'm not sure, but here's where you should be...";
const RECENT_RELEASE_DAYS: i64 = 4 * 365 + 1;
const HELP_SUGGESTIONS: usize = 3;
const GAME_MOVES: [&str; 3] = ["rock", "paper", "scissors"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchSettings {
    pub limits: LimitsConfig,
    pub expose_provider_errors: bool,
}

#[derive(Clone)]
pub struct Dispatcher {
    persona: Persona,
    settings: DispatchSettings,
    images: Arc<dyn ImageSearch>,
    videos: Arc<dyn VideoSearch>,
    tweets: Arc<dyn TweetSearch>,
    geocoder: Arc<dyn Geocoder>,
    dictionary: Arc<dyn Dictionary>,
    answers: Arc<dyn AnswerEngine>,
    causes: Arc<dyn CauseFinder>,
    eco: Arc<dyn EcoSafety>,
    renderer: Arc<dyn FragmentRenderer>,
    shortener: LinkShortener,
    presenter: ListPresenter,
}

impl Dispatcher {
    pub fn new(persona: Persona, settings: DispatchSettings, providers: Providers) -> Self {
        let shortener = LinkShortener::new(providers.shortener);
        let publisher = ArtifactPublisher::new(providers.destinations, shortener.clone());
        let presenter = ListPresenter::new(persona.clone(), providers.renderer.clone(), publisher);
        Self {
            persona,
            settings,
            images: providers.images,
            videos: providers.videos,
            tweets: providers.tweets,
            geocoder: providers.geocoder,
            dictionary: providers.dictionary,
            answers: providers.answers,
            causes: providers.causes,
            eco: providers.eco,
            renderer: providers.renderer,
            shortener,
            presenter,
        }
    }

    /// Runs the handler for `intent`. A random fallback is resolved to a
    /// concrete search first.
    pub async fn dispatch(&self, intent: Intent, composer: &mut Composer, chooser: &mut dyn Chooser) {
        let intent = match intent {
            Intent::RandomFallback { subject, limit } => {
                resolve_fallback(composer.channel(), subject, limit, chooser)
            }
            other => other,
        };

        if let Err(failure) = self.run(&intent, composer, chooser).await {
            error!(
                event_name = "agent.dispatch.provider_failed",
                intent = intent.name(),
                operation = failure.operation,
                provider = failure.source.provider(),
                channel = composer.channel().as_str(),
                error = %failure.source,
                "provider call failed"
            );
            let detail = self.settings.expose_provider_errors.then(|| failure.source.to_string());
            apologize(composer, chooser, detail);
        }
    }

    async fn run(
        &self,
        intent: &Intent,
        composer: &mut Composer,
        chooser: &mut dyn Chooser,
    ) -> Result<(), DispatchError> {
        let limits = self.settings.limits;
        match intent {
            Intent::ImageSearch { subject, limit } => {
                let items = self.images.search(subject, limit.resolve(limits.image)).await.during("images.search")?;
                self.presenter.present(composer, chooser, subject, &ResultItems::Images(items)).await;
            }
            Intent::VideoSearch { subject, limit } => {
                let ids =
                    self.videos.search_ids(subject, limit.resolve(limits.video)).await.during("videos.search_ids")?;
                let items = if ids.is_empty() {
                    Vec::new()
                } else {
                    self.videos.details(&ids).await.during("videos.details")?
                };
                self.presenter.present(composer, chooser, subject, &ResultItems::Videos(items)).await;
            }
            Intent::TweetSearch { subject, limit } => {
                let items = self.tweets.search(subject, limit.resolve(limits.tweet)).await.during("tweets.search")?;
                self.presenter.present(composer, chooser, subject, &ResultItems::Tweets(items)).await;
            }
            Intent::CauseSearch { keyword } => {
                let keyword = if keyword.trim().is_empty() { DEFAULT_CAUSE_KEYWORD } else { keyword.as_str() };
                let items = self.causes.search_causes(keyword, limits.cause).await.during("causes.search")?;
                self.presenter.present(composer, chooser, keyword, &ResultItems::Causes(items)).await;
            }
            Intent::SafetyCheck { subject } => self.safety(subject, composer, chooser).await?,
            Intent::LocationSearch { subject, uncertain } => {
                self.location(subject, composer, chooser).await?;
                if *uncertain {
                    composer.preface(UNCERTAIN_LOCATION_PREFACE);
                }
            }
            Intent::Definition { subject } => self.definition(subject, composer, chooser).await?,
            Intent::GeneralAnswer { subject } => self.answer(subject, composer, chooser).await?,
            Intent::Game { move_name } => self.game(move_name, composer, chooser),
            Intent::Greeting => composer.say(phrase(chooser, PhraseCategory::Greeting)),
            Intent::Help => self.help(composer, chooser),
            Intent::Error { detail } => apologize(composer, chooser, detail.clone()),
            // Resolved to a concrete intent in `dispatch`.
            Intent::RandomFallback { subject, .. } => self.answer(subject, composer, chooser).await?,
        }
        Ok(())
    }

    /// Fixed replies chosen by the cascade.
    pub async fn respond(&self, shortcut: Shortcut, composer: &mut Composer, chooser: &mut dyn Chooser) {
        match shortcut {
            Shortcut::MakerCredit => {
                let maker = &self.persona.maker;
                if composer.channel().renders_inline() {
                    composer.say_raw(format!(
                        "{} made me. You can find them <a href=\"{}\" target=\"_blank\">here</a>.",
                        escape_markup(maker),
                        escape_markup(&self.persona.maker_url)
                    ));
                } else {
                    let url = self.shortener.shorten(&self.persona.maker_url).await;
                    composer.say(format!("{maker} made me. You can find them at {url}"));
                }
            }
            Shortcut::EasterEgg => {
                composer.say_raw("<em>*salute*</em>");
                composer.say_raw(
                    "<p class=\"general-bucket\"><a href=\"/assets/general-bucket.png\" target=\"_blank\">\
                     <img src=\"/assets/general-bucket.png\" class=\"general-bucket\" alt=\"General Bucket\" /></a></p>",
                );
            }
            Shortcut::HowAre => composer.say(phrase(chooser, PhraseCategory::HowAre)),
            Shortcut::GameSuggestion => {
                composer.say(format!("How about {}", phrase(chooser, PhraseCategory::GameSuggestion)));
            }
            Shortcut::UnknownSafetyLocation => {
                let none = phrase(chooser, PhraseCategory::FoundNone);
                composer.say(format!("{none} safety information for wherever it is that you are."));
            }
        }
    }

    async fn location(
        &self,
        subject: &str,
        composer: &mut Composer,
        chooser: &mut dyn Chooser,
    ) -> Result<(), DispatchError> {
        let location = match self.geocoder.geocode(subject).await.during("geocoder.geocode")? {
            GeocodeOutcome::Found(location) => location,
            GeocodeOutcome::NotFound { .. } => {
                let none = phrase(chooser, PhraseCategory::FoundNone);
                composer.say(format!("{none} {subject} locations."));
                return Ok(());
            }
        };
        let name = location.display_name().to_string();

        if !composer.channel().renders_inline() {
            let url = self.shortener.shorten(&maps_url(&location.formatted_address)).await;
            let found = found_some(chooser);
            composer.say(format!("{found} {name}: {url}"));
            return Ok(());
        }

        match self.renderer.render_location(&location, false) {
            Ok(markup) => {
                composer.share(self.persona.share_text(&format!("found {name}")));
                let found = found_some(chooser);
                composer.say(format!("{found} {name}:"));
                composer.say_raw(markup);
            }
            Err(render_error) => {
                error!(
                    event_name = "agent.compose.render_failed",
                    resource = "location",
                    error = %render_error,
                    "location could not be rendered"
                );
                apologize(composer, chooser, None);
            }
        }
        Ok(())
    }

    async fn safety(
        &self,
        subject: &str,
        composer: &mut Composer,
        chooser: &mut dyn Chooser,
    ) -> Result<(), DispatchError> {
        let (area, name) = if is_zip_code(subject) {
            (SafetyArea::Zip(subject.to_string()), subject.to_string())
        } else {
            match self.geocoder.geocode(subject).await.during("geocoder.geocode")? {
                GeocodeOutcome::Found(location) => (
                    SafetyArea::Coordinates { latitude: location.latitude, longitude: location.longitude },
                    location.display_name().to_string(),
                ),
                GeocodeOutcome::NotFound { .. } => {
                    let none = phrase(chooser, PhraseCategory::FoundNone);
                    composer.say(format!("{none} safety information for {subject}"));
                    return Ok(());
                }
            }
        };

        let report = self.eco.report(&area).await.during("eco.report")?;
        match summarize_safety(&report, Utc::now().date_naive()) {
            SafetySummary::Clear => {
                let good_news = phrase(chooser, PhraseCategory::GoodNews);
                composer.say(format!("{good_news} I found no toxic facilities near {name}!"));
            }
            SafetySummary::Facilities { total, recent } => {
                composer.say(format!(
                    "There are {total} industrial facilities working with toxic chemicals near {name}."
                ));
                let recent = if recent == 0 { "None".to_string() } else { recent.to_string() };
                composer.say(format!("{recent} of them have released chemicals into the environment recently."));
            }
        }

        let reading = envirofacts_url(&name);
        if composer.channel().renders_inline() {
            composer.share(self.persona.share_text(&format!("told me how safe it is in {name}")));
            composer.say_raw(format!(
                "<p class=\"powered-by\"><a href=\"{}\" target=\"_blank\">Powered by Envirofacts</a></p>",
                escape_markup(&reading)
            ));
        } else {
            let url = self.shortener.shorten(&reading).await;
            composer.say(format!("Read more at Envirofacts: {url}"));
        }
        Ok(())
    }

    async fn definition(
        &self,
        subject: &str,
        composer: &mut Composer,
        chooser: &mut dyn Chooser,
    ) -> Result<(), DispatchError> {
        let definitions = self.dictionary.define(subject).await.during("dictionary.define")?;
        let Some(definition) = definitions.into_iter().next() else {
            return self.answer(subject, composer, chooser).await;
        };

        let found = found_some(chooser);
        composer.say(format!("{found} a definition of {}:", definition.word));
        if composer.channel().renders_inline() {
            composer.share(self.persona.share_text(&format!("defined \"{}\"", definition.word)));
            composer.say(definition.text);
            let link = format!("{WORDNIK_WORD_URL}{}", encode_component(&definition.word));
            composer.say_raw(format!(
                "<p class=\"powered-by\"><a href=\"{}\" target=\"_blank\">Powered by Wordnik</a></p>",
                escape_markup(&link)
            ));
        } else {
            composer.say(format!("{} (wordnik.com)", definition.text));
        }
        Ok(())
    }

    async fn answer(&self, subject: &str, composer: &mut Composer, chooser: &mut dyn Chooser) -> Result<(), DispatchError> {
        let summary = self.answers.query(&format!("define {subject}")).await.during("answers.query")?;
        let has_abstract = !summary.abstract_text.trim().is_empty();
        let inline = composer.channel().renders_inline();

        // The mobile encyclopedia suits text messages and embedded frames.
        let bang = if inline && has_abstract { "!w" } else { "!wm" };
        let encyclopedia = self.answers.query(&format!("{bang} {subject}")).await.during("answers.query")?;
        let redirect = encyclopedia.redirect_url.trim();

        if has_abstract {
            let heading = if summary.heading.trim().is_empty() { subject } else { summary.heading.trim() };
            composer.say(format!("Let me tell you about {heading}:"));
            composer.say(summary.abstract_text.trim());
            if redirect.is_empty() {
                return Ok(());
            }
            if inline {
                composer.share(self.persona.share_text(&format!("told me all about {heading}")));
                composer.say_raw(format!(
                    "<p><a href=\"{}\" target=\"_blank\" class=\"powered-by\">Read more on Wikipedia</a></p>",
                    escape_markup(redirect)
                ));
            } else {
                let url = self.shortener.shorten(redirect).await;
                composer.say(format!("Read more at Wikipedia: {url}"));
            }
            return Ok(());
        }

        let not_sure = phrase(chooser, PhraseCategory::NotSure);
        if redirect.is_empty() {
            composer.say(not_sure);
        } else if inline {
            composer.say(format!("{not_sure} Let's ask Wikipedia:"));
            composer.say_raw(format!(
                "<iframe src=\"{}\" class=\"wikipedia\"></iframe>",
                escape_markup(&force_https(redirect))
            ));
        } else {
            let url = self.shortener.shorten(redirect).await;
            composer.say(format!("{not_sure} Let's ask Wikipedia: {url}"));
        }
        Ok(())
    }

    fn game(&self, move_name: &str, composer: &mut Composer, chooser: &mut dyn Chooser) {
        let lowered = move_name.to_lowercase();
        if GAME_MOVES.contains(&lowered.as_str()) {
            let own = pick_of(chooser, GAME_MOVES).unwrap_or("rock");
            composer.say(format!("{}!", capitalize(own)));
            let category = if own == lowered {
                PhraseCategory::GameTie
            } else if beats(&lowered, own) {
                PhraseCategory::GameWin
            } else {
                PhraseCategory::GameLose
            };
            composer.say(phrase(chooser, category));
            return;
        }

        if composer.channel().renders_inline() {
            composer.say_raw(format!("<em>You {}</em>", escape_markup(move_name)));
            composer.say_raw(
                "<p class=\"adventure\"><a href=\"?query=What+is+Zork\" class=\"suggestion\" \
                 data-suggestion=\"What is Zork?\">What is Zork?</a></p>",
            );
        } else {
            composer.say(phrase(chooser, PhraseCategory::Adventure));
        }
    }

    fn help(&self, composer: &mut Composer, chooser: &mut dyn Chooser) {
        let persona = &self.persona;
        composer.say("Please let me help!");
        composer.say(format!(
            "I'm {} and I can help you answer questions and find things online. Try asking:",
            persona.display_name
        ));

        let suggestions =
            SuggestionGenerator::for_channel(composer.channel()).suggest_many(HELP_SUGGESTIONS, chooser);

        if composer.channel().renders_inline() {
            for suggestion in suggestions {
                let query = form_urlencoded::Serializer::new(String::new()).append_pair("query", &suggestion).finish();
                composer.say_raw(format!(
                    "<p><a href=\"?{}\" class=\"suggestion\">\"{}\"</a></p>",
                    escape_markup(&query),
                    escape_markup(&suggestion)
                ));
            }
            composer.say_raw(format!("<p>I was put together by {}.</p>", escape_markup(&persona.maker)));
            composer.say_raw(format!(
                "<p>You can read my source at <a href=\"{url}\" target=\"_blank\">{url}</a>.</p>",
                url = escape_markup(&persona.maker_url)
            ));
        } else {
            for suggestion in suggestions {
                composer.say(suggestion);
            }
            composer.say(format!("I was put together by {}.", persona.maker));
            composer.say(format!("You can read my source at {}", persona.maker_url));
        }
    }
}

/// Outcome of an eco-safety lookup, reduced to what the reply states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafetySummary {
    Clear,
    Facilities { total: usize, recent: usize },
}

/// Counts facilities with at least one release in the four years up to `today`.
pub fn summarize_safety(report: &SafetyReport, today: NaiveDate) -> SafetySummary {
    if report.facilities.is_empty() {
        return SafetySummary::Clear;
    }
    let cutoff = today - Duration::days(RECENT_RELEASE_DAYS);
    let recent = report.facilities.iter().filter(|facility| facility.released_since(cutoff)).count();
    SafetySummary::Facilities { total: report.facilities.len(), recent }
}

fn beats(player: &str, opponent: &str) -> bool {
    matches!((player, opponent), ("paper", "rock") | ("scissors", "paper") | ("rock", "scissors"))
}

fn is_zip_code(subject: &str) -> bool {
    subject.len() == 5 && subject.chars().all(|character| character.is_ascii_digit())
}

pub fn maps_url(address: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("f", "q")
        .append_pair("source", "s_q")
        .append_pair("hl", "en")
        .append_pair("q", address)
        .append_pair("ie", "UTF8")
        .append_pair("z", "12")
        .append_pair("t", "m")
        .append_pair("iwloc", "near")
        .finish();
    format!("{MAPS_BASE_URL}?{query}")
}

fn envirofacts_url(name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new()).append_pair("zipcode", name).finish();
    format!("{ENVIROFACTS_URL}?{query}")
}

fn encode_component(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}
