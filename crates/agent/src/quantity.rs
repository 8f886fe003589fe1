use regex::Regex;
use wren_core::domain::limit::Limit;

/// Lexical quantities, in match priority order. Longer aliases that share a
/// prefix with shorter ones ("a few" and "a", "seventeen" and "seven") come first.
const ALIASES: &[(&str, Limit)] = &[
    ("some", Limit::Count(5)),
    ("a few", Limit::Count(3)),
    ("a couple", Limit::Count(2)),
    ("many", Limit::Count(20)),
    ("several", Limit::Count(20)),
    ("all", Limit::Unlimited),
    ("a bunch", Limit::Count(15)),
    ("any", Limit::Count(10)),
    ("an", Limit::Count(1)),
    ("a", Limit::Count(1)),
    ("ten", Limit::Count(10)),
    ("eleven", Limit::Count(11)),
    ("twelve", Limit::Count(12)),
    ("thirteen", Limit::Count(13)),
    ("fourteen", Limit::Count(14)),
    ("fifteen", Limit::Count(15)),
    ("sixteen", Limit::Count(16)),
    ("seventeen", Limit::Count(17)),
    ("eighteen", Limit::Count(18)),
    ("nineteen", Limit::Count(19)),
    ("twenty", Limit::Count(20)),
    ("one", Limit::Count(1)),
    ("two", Limit::Count(2)),
    ("three", Limit::Count(3)),
    ("four", Limit::Count(4)),
    ("five", Limit::Count(5)),
    ("six", Limit::Count(6)),
    ("seven", Limit::Count(7)),
    ("eight", Limit::Count(8)),
    ("nine", Limit::Count(9)),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quantified {
    pub limit: Limit,
    pub subject: String,
}

/// Reads one leading quantity off a cleaned query.
#[derive(Clone, Debug)]
pub struct QuantityExtractor {
    numeric: Regex,
    lexical: Regex,
}

impl QuantityExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let alternation = ALIASES.iter().map(|(alias, _)| *alias).collect::<Vec<_>>().join("|");
        Ok(Self {
            numeric: Regex::new(r"^(?P<limit>[0-9]+) (?P<subject>.+)$")?,
            lexical: Regex::new(&format!(
                r"(?i)^(?P<limit>{alternation})( of)?( the)? (?P<subject>.+)$"
            ))?,
        })
    }

    pub fn extract(&self, query: &str) -> Quantified {
        if let Some(captures) = self.numeric.captures(query) {
            // A count that does not fit is not a quantity.
            if let Ok(count) = captures["limit"].parse::<u32>() {
                return Quantified { limit: Limit::Count(count), subject: captures["subject"].to_string() };
            }
        }

        if let Some(captures) = self.lexical.captures(query) {
            let alias = captures["limit"].to_lowercase();
            if let Some((_, limit)) = ALIASES.iter().find(|(candidate, _)| *candidate == alias) {
                return Quantified { limit: *limit, subject: captures["subject"].to_string() };
            }
        }

        Quantified { limit: Limit::Unset, subject: query.to_string() }
    }
}
