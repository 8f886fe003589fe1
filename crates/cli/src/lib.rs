pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "wren",
    about = "Wren operator CLI",
    long_about = "Ask the Wren agent questions from a terminal, sample suggestions, inspect configuration, and check deployment readiness.",
    after_help = "Examples:\n  wren ask show me 3 owls\n  wren ask --channel sms what does serendipity mean\n  wren suggest 5\n  wren doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Answer one utterance the way the given channel would receive it")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "The utterance; words are joined with spaces")]
        text: Vec<String>,
        #[arg(long, default_value = "web", help = "Delivery channel: web, sms or voice")]
        channel: String,
        #[arg(long, allow_hyphen_values = true, help = "Caller latitude, paired with --lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, help = "Caller longitude, paired with --lat")]
        lon: Option<f64>,
        #[arg(long, help = "Seed the random source for repeatable replies")]
        seed: Option<u64>,
        #[arg(long, help = "Emit the reply as JSON")]
        json: bool,
    },
    #[command(about = "Print example utterances the agent understands")]
    Suggest {
        #[arg(default_value_t = 3, help = "How many suggestions to print")]
        count: usize,
        #[arg(long, default_value = "web", help = "Channel whose templates are sampled")]
        channel: String,
        #[arg(long, help = "Seed the random source for repeatable output")]
        seed: Option<u64>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and report which outbound services are wired")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { text, channel, lat, lon, seed, json } => {
            commands::ask::run(commands::ask::AskRequest {
                text: text.join(" "),
                channel,
                latitude: lat,
                longitude: lon,
                seed,
                json,
            })
        }
        Command::Suggest { count, channel, seed } => commands::suggest::run(count, &channel, seed),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
