use regex::Regex;

const STRIPPED_PUNCTUATION: [char; 6] = ['.', ',', ':', '!', '?', '"'];

const GREETING_PATTERN: &str = r"(?i)^(hi|hello|hey|howdy|good (morning|afternoon|evening|day))$";

const LEADING_POLITENESS_PATTERN: &str = r"(?i)^((please|hey|hi|hello|kindly|pray|help|go|run|do|perform|will you|would you|can i have|may i have|could you|can you|quickly|immediately|try to|try)( for)?( me| us)?( an?)? )*";

const TRAILING_POLITENESS_PATTERN: &str =
    r"(?i)( (please|right now|now|quickly|immediately|stat|thanks|thank you|for me|for us))*$";

const SEARCH_VERB_PATTERN: &str = r"(?i)^((i )?(we )?(find|get|search|bring|show|give|list|display|fetch|query|look|want|need|gett)(you to|ing)?( for)?( me| us)? )*";

/// Result of cleaning one raw utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// Cleaned text ready for the canned matcher and the cascade.
    Query(String),
    /// Only greetings, the agent's name or politeness remained.
    Greeting,
}

/// Strips punctuation, addressing of the agent and request boilerplate.
#[derive(Clone, Debug)]
pub struct Normalizer {
    leading_name: Regex,
    trailing_name: Regex,
    greeting: Regex,
    leading_politeness: Regex,
    trailing_politeness: Regex,
    search_verbs: Regex,
}

impl Normalizer {
    /// `agent_name` is matched case-insensitively and may carry a possessive
    /// or one trailing non-space character ("wren's", "wren!").
    pub fn new(agent_name: &str) -> Result<Self, regex::Error> {
        let name = regex::escape(agent_name.trim());
        Ok(Self {
            leading_name: Regex::new(&format!(r"(?i)^(\w+ )?{name}('s|\S)?( |$)"))?,
            trailing_name: Regex::new(&format!(r"(?i)(^| ){name}('s|\S)?( \w+)?$"))?,
            greeting: Regex::new(GREETING_PATTERN)?,
            leading_politeness: Regex::new(LEADING_POLITENESS_PATTERN)?,
            trailing_politeness: Regex::new(TRAILING_POLITENESS_PATTERN)?,
            search_verbs: Regex::new(SEARCH_VERB_PATTERN)?,
        })
    }

    pub fn normalize(&self, raw: &str) -> Normalized {
        let without_punctuation: String =
            raw.chars().filter(|character| !STRIPPED_PUNCTUATION.contains(character)).collect();
        let collapsed = collapse_whitespace(&without_punctuation);

        let unaddressed = self.leading_name.replace(&collapsed, "");
        let unaddressed = self.trailing_name.replace(&unaddressed, "");

        if self.greeting.is_match(&unaddressed) {
            return Normalized::Greeting;
        }

        let trimmed = self.leading_politeness.replace(&unaddressed, "");
        let trimmed = self.trailing_politeness.replace(&trimmed, "");
        let cleaned = self.search_verbs.replace(&trimmed, "");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            Normalized::Greeting
        } else {
            Normalized::Query(cleaned.to_string())
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
