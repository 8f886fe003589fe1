//! Example utterances the agent knows how to handle, built from templates.

use serde::Serialize;
use wren_core::domain::resource::{ResourceRegistry, ResourceType};
use wren_core::random::{between, pick, pick_of, shuffle, Chooser};
use wren_core::Channel;

const TEMPLATE_COUNT: usize = 7;

const PEOPLE: &[&str] = &[
    "Ada Lovelace",
    "Grace Hopper",
    "Alan Turing",
    "Katherine Johnson",
    "Hedy Lamarr",
    "Nikola Tesla",
    "Frida Kahlo",
    "Miles Davis",
    "Hayao Miyazaki",
    "Marie Curie",
];

/// Places safety lookups can say something useful about.
const SAFE_PLACES: &[&str] =
    &["Grand Central Terminal", "Reykjavik", "Kyoto", "Lisbon", "Portland", "Timbuktu", "Atlantis", "Boring, Oregon"];
const EXTRA_PLACES: &[&str] = &["Dublin", "Middle Earth"];

/// Nouns that pluralize with a bare "s".
const THINGS: &[&str] = &[
    "telescope",
    "volcano",
    "otter",
    "hedgehog",
    "lighthouse",
    "steam engine",
    "bicycle",
    "mechanical keyboard",
    "synthesizer",
    "bonsai tree",
    "suspension bridge",
    "sea turtle",
];
const IRREGULAR_THINGS: &[&str] = &["moose", "sheep", "jazz", "origami", "photosynthesis", "Apollo 11", "Enigma machine"];

const SEARCH_VERBS: &[&str] = &["Find me", "Search for", "Get me", "Show me", "Look for", "Find"];
const NUMBER_WORDS: &[&str] = &["two", "three", "four", "five", "ten", "twenty", "some", "all the"];

/// One suggestion, or several in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Suggestions {
    One(String),
    Many(Vec<String>),
}

impl Suggestions {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(suggestion) => vec![suggestion],
            Self::Many(suggestions) => suggestions,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SuggestionGenerator {
    registry: ResourceRegistry,
}

impl SuggestionGenerator {
    pub fn for_channel(channel: Channel) -> Self {
        Self { registry: ResourceRegistry::for_channel(channel) }
    }

    pub fn suggest(&self, count: usize, chooser: &mut dyn Chooser) -> Suggestions {
        let mut suggestions = self.suggest_many(count, chooser);
        if suggestions.len() == 1 {
            return Suggestions::One(suggestions.remove(0));
        }
        Suggestions::Many(suggestions)
    }

    /// Templates are drawn from a shuffled bag that is emptied before it is refilled,
    /// so no template repeats until all of them have been used.
    pub fn suggest_many(&self, count: usize, chooser: &mut dyn Chooser) -> Vec<String> {
        let person = draw(chooser, PEOPLE);
        let verb = draw(chooser, SEARCH_VERBS);
        let mut bag: Vec<usize> = Vec::new();
        let mut suggestions = Vec::with_capacity(count);

        for _ in 0..count {
            if bag.is_empty() {
                bag = (0..TEMPLATE_COUNT).collect();
                shuffle(chooser, &mut bag);
            }
            let template = bag.remove(0);
            suggestions.push(self.fill(template, person, verb, chooser));
        }

        suggestions
    }

    fn fill(&self, template: usize, person: &str, verb: &str, chooser: &mut dyn Chooser) -> String {
        let searchable: Vec<ResourceType> = self.registry.searchable().collect();
        let resource = pick(chooser, &searchable).copied().unwrap_or(ResourceType::Image);
        let preposition = match resource {
            ResourceType::Image => pick(chooser, &["of", "with"]).copied().unwrap_or("of"),
            _ => pick(chooser, &["of", "about", "with"]).copied().unwrap_or("of"),
        };
        let type_plural = match resource {
            ResourceType::Tweet => "tweets".to_string(),
            _ => format!("{}s", draw(chooser, resource.synonyms())),
        };

        match template {
            0 => {
                let number = draw(chooser, NUMBER_WORDS);
                let thing = draw(chooser, THINGS);
                format!("{verb} {number} {type_plural} {preposition} {thing}s.")
            }
            1 => {
                let number = between(chooser, 2, 20);
                let thing = draw_any_thing(chooser);
                format!("{verb} {number} {thing} {type_plural}.")
            }
            2 => {
                if pick_of(chooser, [true, false]).unwrap_or(true) {
                    format!("Define {}.", draw_any_thing(chooser))
                } else {
                    format!("What is a {}?", draw(chooser, THINGS))
                }
            }
            3 => {
                let lead = pick_of(chooser, ["Where is", "Where can I find", "Locate"]).unwrap_or("Where is");
                let all_places: Vec<&str> = SAFE_PLACES.iter().chain(EXTRA_PLACES).copied().collect();
                format!("{lead} {}?", draw(chooser, &all_places))
            }
            4 => {
                let lead = pick_of(chooser, ["Who is", "Do you know"]).unwrap_or("Who is");
                format!("{lead} {person}?")
            }
            5 => {
                let lead = pick_of(chooser, ["How can I", "Where can I"]).unwrap_or("How can I");
                let action = pick_of(chooser, ["help", "donate to"]).unwrap_or("help");
                let group = pick_of(chooser, ["schools", "kids", "teachers"]).unwrap_or("schools");
                format!("{lead} {action} {group}?")
            }
            _ => {
                let lead =
                    pick_of(chooser, ["Is it safe in", "Am I safe in", "How safe is it in"]).unwrap_or("Is it safe in");
                format!("{lead} {}?", draw(chooser, SAFE_PLACES))
            }
        }
    }
}

fn draw<'a>(chooser: &mut dyn Chooser, items: &[&'a str]) -> &'a str {
    pick(chooser, items).copied().unwrap_or_default()
}

fn draw_any_thing(chooser: &mut dyn Chooser) -> &'static str {
    let everything: Vec<&'static str> = THINGS.iter().chain(IRREGULAR_THINGS).copied().collect();
    draw(chooser, &everything)
}
