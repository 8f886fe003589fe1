use anyhow::Context;
use serde::Serialize;
use wren_agent::Query;
use wren_core::config::LoadOptions;
use wren_core::domain::message::{unescape_markup, Reply};
use wren_core::random::RandomSource;
use wren_core::Channel;
use wren_server::api::QueryRequest;
use wren_server::bootstrap::{bootstrap, Application, BootstrapError};

use super::CommandResult;

const COMMAND: &str = "ask";

#[derive(Debug, Clone, Default)]
pub struct AskRequest {
    pub text: String,
    pub channel: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AskOutput<'a> {
    command: &'static str,
    channel: Channel,
    #[serde(flatten)]
    reply: &'a Reply,
}

pub fn run(request: AskRequest) -> CommandResult {
    run_with_options(request, LoadOptions::default())
}

pub fn run_with_options(request: AskRequest, options: LoadOptions) -> CommandResult {
    let json = request.json;
    let seed = request.seed;
    let parsed = QueryRequest {
        query: request.text,
        channel: Some(request.channel),
        lat: request.latitude,
        lon: request.longitude,
    }
    .into_utterance();
    let query = match parsed {
        Ok(query) => query,
        Err(error) => return CommandResult::failure(COMMAND, "invalid_input", error.to_string(), 3),
    };

    let application = match bootstrap(options) {
        Ok(application) => application,
        Err(BootstrapError::Config(error)) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2);
        }
        Err(error) => return CommandResult::failure(COMMAND, "bootstrap", error.to_string(), 4),
    };

    let reply = match answer(&application, &query, seed) {
        Ok(reply) => reply,
        Err(error) => return CommandResult::failure(COMMAND, "runtime", format!("{error:#}"), 5),
    };

    if json {
        let output = AskOutput { command: COMMAND, channel: query.channel, reply: &reply };
        return match serde_json::to_string_pretty(&output) {
            Ok(rendered) => CommandResult { exit_code: 0, output: rendered },
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 5),
        };
    }

    CommandResult { exit_code: 0, output: render_human(&reply, query.channel) }
}

fn answer(application: &Application, query: &Query, seed: Option<u64>) -> anyhow::Result<Reply> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    let mut chooser = seed.map(RandomSource::seeded).unwrap_or_else(RandomSource::from_entropy);
    Ok(runtime.block_on(application.agent.respond(query, &mut chooser)))
}

/// Web replies carry markup and are printed as-is; text channels are escaped
/// on the wire, so they are unescaped for the terminal.
fn render_human(reply: &Reply, channel: Channel) -> String {
    let mut lines: Vec<String> = reply
        .messages
        .iter()
        .map(|message| match channel {
            Channel::Web => message.clone(),
            Channel::Sms | Channel::Voice => unescape_markup(message),
        })
        .collect();

    if let Some(suggestion) = &reply.share_suggestion {
        lines.push(format!("(share: {suggestion})"));
    }
    if lines.is_empty() {
        lines.push("(no reply)".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use wren_core::domain::message::Reply;
    use wren_core::Channel;

    use wren_core::config::LoadOptions;

    use super::{render_human, run_with_options, AskRequest};

    #[test]
    fn text_channel_replies_are_unescaped_for_the_terminal() {
        let reply = Reply { messages: vec!["Tom &amp; Jerry".to_string()], share_suggestion: None };

        assert_eq!(render_human(&reply, Channel::Sms), "Tom & Jerry");
        assert_eq!(render_human(&reply, Channel::Web), "Tom &amp; Jerry");
    }

    #[test]
    fn empty_reply_renders_a_placeholder_line() {
        assert_eq!(render_human(&Reply::default(), Channel::Voice), "(no reply)");
    }

    #[test]
    fn unpaired_coordinates_are_rejected_before_bootstrap() {
        let request = AskRequest {
            text: "where am i".to_string(),
            channel: "sms".to_string(),
            longitude: Some(-74.0),
            ..AskRequest::default()
        };
        let result = run_with_options(request, LoadOptions::default());

        assert_eq!(result.exit_code, 3);
        assert!(result.output.contains("\"error_class\":\"invalid_input\""));
    }
}
