//! Ordered intent rules. The first rule that produces a classification wins;
//! nothing after it is consulted, even if its handler later fails.

use regex::{Captures, Regex};
use wren_core::domain::intent::{Coordinates, Intent};
use wren_core::domain::limit::Limit;
use wren_core::domain::resource::{ResourceRegistry, ResourceType};
use wren_core::random::{between, pick, Chooser};
use wren_core::Channel;

use crate::quantity::Quantified;

pub const DEFAULT_CAUSE_KEYWORD: &str = "coding";
const EASTER_EGG_SUBJECT: &str = "general bucket";
const UNKNOWN_POSITION_SUBJECT: &str = "am i";
const HERE: &str = "here";

const SUBJECT_FIRST: usize = 1;
const RESOURCE_PREPOSITIONS: &str = "about|for|of|showing|with|like|having";
const CAUSE_PATTERN: &str =
    r"(?i)(help (teachers|kids|schools|children)|(what|how|where).*(donate|donation|money|cash)|worthy cause)";
const SAFETY_PATTERN: &str =
    r"(?i)^((am i|is it|are we|are you) safe|how safe (am i|is it|is|are we|are you)) ?(in )?(?P<subject>.*)$";
const LOCATION_PATTERN: &str =
    r"(?i)^(where( (is|are|.*find))?|.*directions?( to)?|locate|.*locations?( of| for)?) (?P<subject>.+)$";
const SINGLE_WORD_PATTERN: &str = r"(?i)^(((what do )?you know( of| about)?|what( is| are| was| were)?|tell( me| us)? (of|about)|.*definition( of)?|.*meaning( of)?|define|about)( the| an?)? )?(?P<subject>\w+)$";
const QUESTION_PATTERN: &str = r"(?i)^((what do )?you know( of| about)?|(what|who|why)( is| are| was| were)?|tell( me| us)? (of|about)|.*definition( of)?|.*meaning( of)?|define|about)( the| an?)? (?P<subject>.+)$";
const POLITENESS_PATTERN: &str = r"(?i)^how (are|is|have)";
const PLAY_PATTERN: &str = r"(?i)play a game";
const EASTER_EGG_PATTERN: &str = r"(?i)general bucket";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    ResourceQuery,
    CauseQuery,
    SafetyQuery,
    LocationQuery,
    SingleWordDefinition,
    GeneralQuestion,
    Politeness,
    PlayAGame,
    EasterEgg,
    Fallback,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceQuery => "resource_query",
            Self::CauseQuery => "cause_query",
            Self::SafetyQuery => "safety_query",
            Self::LocationQuery => "location_query",
            Self::SingleWordDefinition => "single_word_definition",
            Self::GeneralQuestion => "general_question",
            Self::Politeness => "politeness",
            Self::PlayAGame => "play_a_game",
            Self::EasterEgg => "easter_egg",
            Self::Fallback => "fallback",
        }
    }
}

/// Fixed replies a rule may produce without calling any provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    MakerCredit,
    EasterEgg,
    HowAre,
    GameSuggestion,
    UnknownSafetyLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Dispatch { intent: Intent, rule: RuleKind },
    Respond { shortcut: Shortcut, rule: RuleKind },
}

impl Classification {
    pub fn rule(&self) -> RuleKind {
        match self {
            Self::Dispatch { rule, .. } | Self::Respond { rule, .. } => *rule,
        }
    }
}

/// Fixed names the cascade treats specially.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeSettings {
    pub maker: String,
    pub maker_address: String,
    pub placeholder_location: String,
}

/// What every rule sees for one request.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// Cleaned query before quantity extraction.
    pub cleaned: &'a str,
    pub quantified: &'a Quantified,
    pub coordinates: Option<Coordinates>,
}

#[derive(Clone, Debug)]
pub struct Rule {
    kind: RuleKind,
    patterns: Vec<Regex>,
}

impl Rule {
    fn new(kind: RuleKind, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns.iter().map(|pattern| Regex::new(pattern)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kind, patterns })
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.indexed_captures(text).map(|(_, captures)| captures)
    }

    /// Captures of the first matching pattern, along with its position.
    fn indexed_captures<'t>(&self, text: &'t str) -> Option<(usize, Captures<'t>)> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(index, pattern)| pattern.captures(text).map(|captures| (index, captures)))
    }

    fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }
}

/// Rules compiled for one channel, in evaluation order.
#[derive(Clone, Debug)]
pub struct IntentCascade {
    channel: Channel,
    registry: ResourceRegistry,
    settings: CascadeSettings,
    rules: Vec<Rule>,
}

impl IntentCascade {
    pub fn new(channel: Channel, settings: CascadeSettings) -> Result<Self, regex::Error> {
        let registry = ResourceRegistry::for_channel(channel);
        let synonyms = registry
            .searchable()
            .flat_map(|resource| resource.synonyms().iter().copied())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let typed_first = format!(
            r"(?i)^(?P<resource>{synonyms})s? (({RESOURCE_PREPOSITIONS}) )+(?P<subject>.+)$"
        );
        let subject_first = format!(r"(?i)^(?P<subject>.+) (?P<resource>{synonyms})s?$");

        let rules = vec![
            Rule::new(RuleKind::ResourceQuery, &[&typed_first, &subject_first])?,
            Rule::new(RuleKind::CauseQuery, &[CAUSE_PATTERN])?,
            Rule::new(RuleKind::SafetyQuery, &[SAFETY_PATTERN])?,
            Rule::new(RuleKind::LocationQuery, &[LOCATION_PATTERN])?,
            Rule::new(RuleKind::SingleWordDefinition, &[SINGLE_WORD_PATTERN])?,
            Rule::new(RuleKind::GeneralQuestion, &[QUESTION_PATTERN])?,
            Rule::new(RuleKind::Politeness, &[POLITENESS_PATTERN])?,
            Rule::new(RuleKind::PlayAGame, &[PLAY_PATTERN])?,
            Rule::new(RuleKind::EasterEgg, &[EASTER_EGG_PATTERN])?,
        ];

        Ok(Self { channel, registry, settings, rules })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule top to bottom; an unmatched query becomes a random fallback.
    pub fn classify(&self, context: &RuleContext<'_>) -> Classification {
        self.rules.iter().find_map(|rule| self.evaluate(rule, context)).unwrap_or_else(|| {
            Classification::Dispatch {
                intent: Intent::RandomFallback {
                    subject: context.cleaned.to_string(),
                    limit: context.quantified.limit,
                },
                rule: RuleKind::Fallback,
            }
        })
    }

    /// Evaluates a single rule in isolation.
    pub fn evaluate(&self, rule: &Rule, context: &RuleContext<'_>) -> Option<Classification> {
        let query = context.quantified.subject.as_str();
        let limit = context.quantified.limit;
        let dispatch = |intent: Intent| Some(Classification::Dispatch { intent, rule: rule.kind });
        let respond = |shortcut: Shortcut| Some(Classification::Respond { shortcut, rule: rule.kind });

        match rule.kind {
            RuleKind::ResourceQuery => {
                let (pattern, captures) = rule.indexed_captures(query)?;
                let resource = self.registry.resolve(&captures["resource"])?;
                // "cat pictures" names one cat but means many.
                let subject = if pattern == SUBJECT_FIRST {
                    naive_plural(&captures["subject"])
                } else {
                    captures["subject"].to_string()
                };
                dispatch(Intent::media_search(resource, subject, limit)?)
            }
            RuleKind::CauseQuery => {
                if !rule.is_match(query) {
                    return None;
                }
                dispatch(Intent::CauseSearch { keyword: DEFAULT_CAUSE_KEYWORD.to_string() })
            }
            RuleKind::SafetyQuery => {
                let captures = rule.captures(query)?;
                let subject = captures["subject"].trim();
                if subject.is_empty() || subject.eq_ignore_ascii_case(HERE) {
                    return match context.coordinates {
                        Some(coordinates) => dispatch(Intent::SafetyCheck { subject: coordinates.as_query() }),
                        None => respond(Shortcut::UnknownSafetyLocation),
                    };
                }
                dispatch(Intent::SafetyCheck { subject: subject.to_string() })
            }
            RuleKind::LocationQuery => {
                let captures = rule.captures(query)?;
                let subject = &captures["subject"];
                let lowered = subject.to_lowercase();
                if lowered == self.settings.maker.to_lowercase() {
                    return dispatch(Intent::LocationSearch {
                        subject: self.settings.maker_address.clone(),
                        uncertain: false,
                    });
                }
                if lowered == UNKNOWN_POSITION_SUBJECT {
                    return match context.coordinates {
                        Some(coordinates) => {
                            dispatch(Intent::LocationSearch { subject: coordinates.as_query(), uncertain: false })
                        }
                        None => dispatch(Intent::LocationSearch {
                            subject: self.settings.placeholder_location.clone(),
                            uncertain: true,
                        }),
                    };
                }
                dispatch(Intent::LocationSearch { subject: subject.to_string(), uncertain: false })
            }
            RuleKind::SingleWordDefinition => {
                if !limit.is_unset() {
                    return None;
                }
                let captures = rule.captures(query)?;
                let subject = &captures["subject"];
                if self.is_maker(subject) {
                    return respond(Shortcut::MakerCredit);
                }
                dispatch(Intent::Definition { subject: subject.to_string() })
            }
            RuleKind::GeneralQuestion => {
                let captures = rule.captures(query)?;
                let subject = &captures["subject"];
                if self.is_maker(subject) {
                    return respond(Shortcut::MakerCredit);
                }
                if self.channel.renders_inline() && subject.eq_ignore_ascii_case(EASTER_EGG_SUBJECT) {
                    return respond(Shortcut::EasterEgg);
                }
                dispatch(Intent::GeneralAnswer { subject: subject.to_string() })
            }
            RuleKind::Politeness => rule.is_match(query).then_some(Classification::Respond {
                shortcut: Shortcut::HowAre,
                rule: rule.kind,
            }),
            RuleKind::PlayAGame => rule.is_match(query).then_some(Classification::Respond {
                shortcut: Shortcut::GameSuggestion,
                rule: rule.kind,
            }),
            RuleKind::EasterEgg => {
                if !self.channel.renders_inline() || !rule.is_match(query) {
                    return None;
                }
                respond(Shortcut::EasterEgg)
            }
            RuleKind::Fallback => None,
        }
    }

    fn is_maker(&self, subject: &str) -> bool {
        subject.to_lowercase() == self.settings.maker.to_lowercase()
    }
}

/// Turns an unmatched query into a concrete search on one of the channel's
/// candidate intents. Only an unspoken quantity adds the answer lookup and the
/// per-type randomized defaults.
pub fn resolve_fallback(channel: Channel, subject: String, limit: Limit, chooser: &mut dyn Chooser) -> Intent {
    let mut candidates: Vec<Option<ResourceType>> =
        ResourceRegistry::for_channel(channel).searchable().map(Some).collect();
    if limit.is_unset() {
        candidates.push(None);
    }

    let chosen = pick(chooser, &candidates).copied().flatten();
    let Some(resource) = chosen else {
        return Intent::GeneralAnswer { subject };
    };

    let limit = if limit.is_unset() {
        match resource {
            ResourceType::Image => Limit::Count(between(chooser, 3, 7)),
            ResourceType::Video => Limit::Count(6),
            ResourceType::Tweet => Limit::Count(between(chooser, 5, 10)),
            ResourceType::Cause => Limit::Unset,
        }
    } else {
        limit
    };

    Intent::media_search(resource, subject.clone(), limit).unwrap_or(Intent::GeneralAnswer { subject })
}

/// Appends an "s" unless the word already ends in one.
fn naive_plural(subject: &str) -> String {
    if subject.to_lowercase().ends_with('s') {
        subject.to_string()
    } else {
        format!("{subject}s")
    }
}
