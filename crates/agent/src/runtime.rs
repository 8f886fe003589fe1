use std::collections::HashMap;

use tracing::{debug, info};
use wren_core::config::AppConfig;
use wren_core::domain::intent::{Coordinates, Intent};
use wren_core::domain::message::Reply;
use wren_core::random::Chooser;
use wren_core::Channel;

use crate::adapters::Providers;
use crate::canned::{Canned, CannedMatcher};
use crate::cascade::{CascadeSettings, Classification, IntentCascade, RuleContext};
use crate::compose::Composer;
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::error::AgentError;
use crate::normalize::{Normalized, Normalizer};
use crate::persona::Persona;
use crate::quantity::QuantityExtractor;
use crate::suggestions::{SuggestionGenerator, Suggestions};

const CHANNELS: [Channel; 3] = [Channel::Web, Channel::Sms, Channel::Voice];
const HELP_SHORTHAND: &str = "?";

/// One inbound utterance.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub text: String,
    pub channel: Channel,
    pub coordinates: Option<Coordinates>,
}

impl Query {
    pub fn new(text: impl Into<String>, channel: Channel) -> Self {
        Self { text: text.into(), channel, coordinates: None }
    }

    pub fn with_coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        self.coordinates = coordinates;
        self
    }
}

/// The full query pipeline. Holds only read-only state, so one instance
/// serves every request.
#[derive(Clone)]
pub struct Agent {
    persona: Persona,
    normalizer: Normalizer,
    canned: CannedMatcher,
    extractor: QuantityExtractor,
    cascades: HashMap<Channel, IntentCascade>,
    dispatcher: Dispatcher,
    default_coordinates: Option<Coordinates>,
}

impl Agent {
    pub fn new(config: &AppConfig, providers: Providers) -> Result<Self, AgentError> {
        let persona = Persona::from_config(&config.agent);
        let settings = CascadeSettings {
            maker: config.agent.maker.clone(),
            maker_address: config.agent.maker_address.clone(),
            placeholder_location: config.agent.placeholder_location.clone(),
        };
        let cascades = CHANNELS
            .into_iter()
            .map(|channel| IntentCascade::new(channel, settings.clone()).map(|cascade| (channel, cascade)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            normalizer: Normalizer::new(&persona.name)?,
            canned: CannedMatcher::new(&persona)?,
            extractor: QuantityExtractor::new()?,
            cascades,
            dispatcher: Dispatcher::new(
                persona.clone(),
                DispatchSettings {
                    limits: config.limits,
                    expose_provider_errors: config.agent.expose_provider_errors,
                },
                providers,
            ),
            default_coordinates: config.agent.known_coordinates(),
            persona,
        })
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Runs one utterance through the pipeline. Never fails: provider and
    /// publish failures come back as apology messages.
    pub async fn respond(&self, query: &Query, chooser: &mut dyn Chooser) -> Reply {
        let mut composer = Composer::new(query.channel);
        let raw = query.text.trim();
        if raw.is_empty() {
            return composer.finish();
        }

        let intent = if raw == HELP_SHORTHAND {
            Intent::Help
        } else {
            match self.normalizer.normalize(raw) {
                Normalized::Greeting => Intent::Greeting,
                Normalized::Query(cleaned) => match self.canned.matches(&cleaned) {
                    Some(Canned::Reply(reply)) => {
                        debug!(
                            event_name = "agent.query.canned",
                            channel = query.channel.as_str(),
                            "canned reply"
                        );
                        composer.say(reply);
                        return composer.finish();
                    }
                    Some(Canned::RockPaperScissors(move_name) | Canned::Adventure(move_name)) => {
                        Intent::Game { move_name }
                    }
                    Some(Canned::Help) => Intent::Help,
                    None => return self.classify_and_run(query, &cleaned, composer, chooser).await,
                },
            }
        };

        info!(
            event_name = "agent.query.classified",
            channel = query.channel.as_str(),
            intent = intent.name(),
            rule = "short_circuit",
            "query classified"
        );
        self.dispatcher.dispatch(intent, &mut composer, chooser).await;
        composer.finish()
    }

    async fn classify_and_run(
        &self,
        query: &Query,
        cleaned: &str,
        mut composer: Composer,
        chooser: &mut dyn Chooser,
    ) -> Reply {
        let Some(cascade) = self.cascades.get(&query.channel) else {
            return composer.finish();
        };
        let quantified = self.extractor.extract(cleaned);
        let context = RuleContext {
            cleaned,
            quantified: &quantified,
            coordinates: query.coordinates.or(self.default_coordinates),
        };

        match cascade.classify(&context) {
            Classification::Dispatch { intent, rule } => {
                info!(
                    event_name = "agent.query.classified",
                    channel = query.channel.as_str(),
                    intent = intent.name(),
                    rule = rule.as_str(),
                    "query classified"
                );
                self.dispatcher.dispatch(intent, &mut composer, chooser).await;
            }
            Classification::Respond { shortcut, rule } => {
                info!(
                    event_name = "agent.query.classified",
                    channel = query.channel.as_str(),
                    shortcut = ?shortcut,
                    rule = rule.as_str(),
                    "query answered by shortcut"
                );
                self.dispatcher.respond(shortcut, &mut composer, chooser).await;
            }
        }
        composer.finish()
    }

    /// Example utterances suited to `channel`.
    pub fn suggest(&self, count: usize, channel: Channel, chooser: &mut dyn Chooser) -> Suggestions {
        SuggestionGenerator::for_channel(channel).suggest(count.max(1), chooser)
    }
}
