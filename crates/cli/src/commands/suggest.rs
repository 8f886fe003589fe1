use wren_agent::suggestions::SuggestionGenerator;
use wren_core::random::RandomSource;
use wren_core::Channel;

use super::CommandResult;

pub fn run(count: usize, channel: &str, seed: Option<u64>) -> CommandResult {
    let channel: Channel = match channel.parse() {
        Ok(channel) => channel,
        Err(error) => return CommandResult::failure("suggest", "invalid_input", error.to_string(), 3),
    };

    let mut chooser = seed.map(RandomSource::seeded).unwrap_or_else(RandomSource::from_entropy);
    let suggestions = SuggestionGenerator::for_channel(channel).suggest_many(count.max(1), &mut chooser);

    let lines: Vec<String> = suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| format!("{}. {suggestion}", index + 1))
        .collect();
    CommandResult { exit_code: 0, output: lines.join("\n") }
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn zero_count_still_prints_one_suggestion() {
        let result = run(0, "web", Some(7));

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output.lines().count(), 1);
        assert!(result.output.starts_with("1. "));
    }

    #[test]
    fn seeded_runs_repeat() {
        assert_eq!(run(4, "sms", Some(42)).output, run(4, "sms", Some(42)).output);
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let result = run(3, "fax", None);

        assert_eq!(result.exit_code, 3);
        assert!(result.output.contains("\"error_class\":\"invalid_input\""));
    }
}
