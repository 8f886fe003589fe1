use wren_core::random::{pick, Chooser};

/// Groups of interchangeable strings; one is drawn per use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhraseCategory {
    Greeting,
    Acknowledge,
    GoodNews,
    FoundVerb,
    FoundNone,
    NotSure,
    Refusal,
    CantHear,
    HowAre,
    Error,
    GameTie,
    GameWin,
    GameLose,
    Adventure,
    GameSuggestion,
}

impl PhraseCategory {
    pub const ALL: [PhraseCategory; 15] = [
        Self::Greeting,
        Self::Acknowledge,
        Self::GoodNews,
        Self::FoundVerb,
        Self::FoundNone,
        Self::NotSure,
        Self::Refusal,
        Self::CantHear,
        Self::HowAre,
        Self::Error,
        Self::GameTie,
        Self::GameWin,
        Self::GameLose,
        Self::Adventure,
        Self::GameSuggestion,
    ];

    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            Self::Greeting => &[
                "Hi there! What can I find for you?",
                "Hello! Ask me anything.",
                "At your service.",
                "What are we looking for today?",
                "Hey! How can I help?",
            ],
            Self::Acknowledge => &[
                "On it!",
                "Give me a second.",
                "Consider it done.",
                "Right away.",
                "Sure thing.",
            ],
            Self::GoodNews => &["Good news!", "Here you go!", "Ta-da!", "Success!", "Look at that,", "Yes!"],
            Self::FoundVerb => &["I found", "I tracked down", "I dug up", "I got you"],
            Self::FoundNone => &[
                "Sorry, I couldn't find any",
                "Strange, there don't seem to be any",
                "The internet appears to be out of",
                "I came back empty-handed looking for",
            ],
            Self::NotSure => &["I'm not sure.", "No idea, honestly.", "Beats me!", "Hmm, good question."],
            Self::Refusal => &[
                "I'd rather not.",
                "That's not something I can do.",
                "Nope, not today.",
                "I'm going to pass on that one.",
            ],
            Self::CantHear => &[
                "Sorry, I didn't catch that.",
                "Could you say that again?",
                "One more time, please?",
                "The line went fuzzy there. Try again?",
            ],
            Self::HowAre => &["Doing great, thanks!", "Pretty good.", "Never better.", "Just fine.", "All systems go!"],
            Self::Error => &[
                "Sorry, something went wrong!",
                "Oops, I hit an error.",
                "Well, that didn't work.",
                "Something broke on my end.",
            ],
            Self::GameTie => &["A tie! Rematch?", "Great minds think alike. Again?"],
            Self::GameWin => &["You win!", "Well played!", "Good game, you got me.", "Victory is yours!"],
            Self::GameLose => &["I win this round!", "Better luck next time.", "Again?"],
            Self::Adventure => &[
                "It is pitch black. You are likely to be eaten by a grue.",
                "You are in a maze of twisty little passages, all alike.",
                "There is a small mailbox here.",
                "Nothing happens.",
            ],
            Self::GameSuggestion => &["Rock, Paper, Scissors?", "Global Thermonuclear War?", "a nice game of chess?"],
        }
    }
}

/// Draws one phrase of a category.
pub fn phrase(chooser: &mut dyn Chooser, category: PhraseCategory) -> &'static str {
    pick(chooser, category.phrases()).copied().unwrap_or_default()
}

/// "Found some" preamble: one good-news phrase followed by one found-verb phrase.
pub fn found_some(chooser: &mut dyn Chooser) -> String {
    let good_news = phrase(chooser, PhraseCategory::GoodNews);
    let found = phrase(chooser, PhraseCategory::FoundVerb);
    format!("{good_news} {found}")
}

#[cfg(test)]
mod tests {
    use wren_core::random::{FirstChoice, ScriptedChoice};

    use super::{found_some, phrase, PhraseCategory};

    #[test]
    fn every_category_has_interchangeable_options() {
        for category in PhraseCategory::ALL {
            let count = category.phrases().len();
            assert!(count >= 2, "{category:?} has only {count} phrase(s)");
            assert!(category.phrases().iter().all(|text| !text.trim().is_empty()));
        }
    }

    #[test]
    fn found_some_combines_two_draws() {
        assert_eq!(found_some(&mut FirstChoice), "Good news! I found");
        assert_eq!(found_some(&mut ScriptedChoice::new([1, 2])), "Here you go! I dug up");
    }

    #[test]
    fn phrase_draws_from_its_category() {
        let drawn = phrase(&mut ScriptedChoice::new([3]), PhraseCategory::NotSure);
        assert_eq!(drawn, "Hmm, good question.");
    }
}
