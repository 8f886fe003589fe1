use regex::Regex;

use crate::persona::Persona;

const GAME_MOVES: [&str; 3] = ["rock", "paper", "scissors"];
const ADVENTURE_DIRECTIONS: [&str; 4] = ["north", "south", "east", "west"];

const HELP_PATTERN: &str = r"(?i)^(help|--help|about|what|what are you|what is this|what do you know( how to do)?|what can you do|who is)$";
const WARGAMES_PATTERN: &str = r"(?i)global.?thermonuclear.?war";

/// Short-circuit answers that bypass quantity extraction and the cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Canned {
    Reply(String),
    RockPaperScissors(String),
    Adventure(String),
    Help,
}

#[derive(Clone, Debug)]
pub struct CannedMatcher {
    literals: Vec<(&'static str, String)>,
    wargames: Regex,
    help: Regex,
}

impl CannedMatcher {
    pub fn new(persona: &Persona) -> Result<Self, regex::Error> {
        let literals = vec![
            ("who are you", format!("I am {}, ask me anything!", persona.display_name)),
            (
                "where are you",
                "Spread thin across a lot of servers, finding things for whoever asks.".to_string(),
            ),
            ("who made you", format!("I was put together by {}, one pattern at a time.", persona.maker)),
            ("what is the best api", "The one that answers on the first try.".to_string()),
            ("are you human", "I prefer to keep an air of mystery.".to_string()),
            ("what are you wearing", "A tailored jacket stitched from a single JSON string.".to_string()),
        ];
        Ok(Self { literals, wargames: Regex::new(WARGAMES_PATTERN)?, help: Regex::new(HELP_PATTERN)? })
    }

    pub fn matches(&self, cleaned: &str) -> Option<Canned> {
        let lowered = cleaned.to_lowercase();

        if let Some((_, reply)) = self.literals.iter().find(|(question, _)| *question == lowered) {
            return Some(Canned::Reply(reply.clone()));
        }

        if GAME_MOVES.contains(&lowered.as_str()) {
            return Some(Canned::RockPaperScissors(lowered));
        }

        if ADVENTURE_DIRECTIONS.contains(&lowered.as_str()) {
            return Some(Canned::Adventure(format!("GO {}", lowered.to_uppercase())));
        }
        if lowered == "look" {
            return Some(Canned::Adventure("LOOK".to_string()));
        }

        if self.wargames.is_match(cleaned) {
            return Some(Canned::Reply("How about a nice game of chess?".to_string()));
        }

        if self.help.is_match(cleaned) {
            return Some(Canned::Help);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Canned, CannedMatcher};
    use crate::persona::Persona;

    fn matcher() -> CannedMatcher {
        let persona = Persona {
            name: "wren".to_string(),
            display_name: "Wren".to_string(),
            maker: "the Wren team".to_string(),
            maker_url: "https://example.com/wren".to_string(),
        };
        match CannedMatcher::new(&persona) {
            Ok(matcher) => matcher,
            Err(error) => panic!("patterns should compile: {error}"),
        }
    }

    #[test]
    fn literal_questions_match_exactly_and_case_insensitively() {
        let matcher = matcher();
        assert_eq!(matcher.matches("Who are you"), Some(Canned::Reply("I am Wren, ask me anything!".to_string())));
        assert!(matches!(matcher.matches("who made you"), Some(Canned::Reply(reply)) if reply.contains("the Wren team")));
        assert_eq!(matcher.matches("who are you really"), None);
    }

    #[test]
    fn games_and_adventure_commands_are_recognised() {
        let matcher = matcher();
        assert_eq!(matcher.matches("Paper"), Some(Canned::RockPaperScissors("paper".to_string())));
        assert_eq!(matcher.matches("north"), Some(Canned::Adventure("GO NORTH".to_string())));
        assert_eq!(matcher.matches("look"), Some(Canned::Adventure("LOOK".to_string())));
    }

    #[test]
    fn pop_culture_phrase_matches_anywhere() {
        assert_eq!(
            matcher().matches("shall we play global thermonuclear war"),
            Some(Canned::Reply("How about a nice game of chess?".to_string()))
        );
    }

    #[test]
    fn help_phrases_are_exact() {
        let matcher = matcher();
        assert_eq!(matcher.matches("what can you do"), Some(Canned::Help));
        assert_eq!(matcher.matches("--help"), Some(Canned::Help));
        assert_eq!(matcher.matches("who is"), Some(Canned::Help));
        assert_eq!(matcher.matches("who is ada lovelace"), None);
    }
}
