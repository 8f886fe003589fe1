use std::path::Path;

use serde::Serialize;
use wren_core::config::{AppConfig, LoadOptions};
use wren_server::bootstrap::{bootstrap_with_config, TEMPLATE_DIR};
use wren_server::health::Readiness;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 4] = ["publish_destinations", "link_shortener", "sms_sender", "provider_keys"];

pub fn run(json_output: bool) -> CommandResult {
    run_with_options(json_output, LoadOptions::default())
}

pub fn run_with_options(json_output: bool, options: LoadOptions) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            checks.push(check_templates(Path::new(TEMPLATE_DIR)));
            let provider_keys = check_provider_keys(&config);
            match bootstrap_with_config(config) {
                Ok(application) => {
                    let readiness = application.readiness();
                    checks.push(check_destinations(&readiness));
                    checks.push(optional_service(
                        "link_shortener",
                        readiness.shortener,
                        "published links are shortened",
                        "shortener disabled; full links are sent",
                    ));
                    checks.push(optional_service(
                        "sms_sender",
                        readiness.sms,
                        "voice transcriptions are answered by text message",
                        "sms sender disabled; voice answers are dropped",
                    ));
                    checks.push(provider_keys);
                }
                Err(error) => {
                    checks.push(DoctorCheck::new("bootstrap", CheckStatus::Fail, error.to_string()));
                    checks.extend(skipped("skipped because the agent could not be wired"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck::new("config_validation", CheckStatus::Fail, error.to_string()));
            checks.push(DoctorCheck::new(
                "templates",
                CheckStatus::Skipped,
                "skipped because configuration did not load",
            ));
            checks.extend(skipped("skipped because configuration did not load"));
        }
    }

    let overall_status = if checks.iter().any(|check| check.status == CheckStatus::Fail) {
        CheckStatus::Fail
    } else if checks.iter().any(|check| check.status == CheckStatus::Warn) {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    let summary = match overall_status {
        CheckStatus::Pass => "doctor: all readiness checks passed",
        CheckStatus::Warn => "doctor: ready, with optional services disabled",
        _ => "doctor: one or more readiness checks failed",
    }
    .to_string();

    DoctorReport { overall_status, summary, checks }
}

fn skipped(reason: &str) -> impl Iterator<Item = DoctorCheck> + '_ {
    DEPENDENT_CHECKS.into_iter().map(move |name| DoctorCheck::new(name, CheckStatus::Skipped, reason))
}

fn check_templates(dir: &Path) -> DoctorCheck {
    if dir.join("results").join("document.html").is_file() {
        return DoctorCheck::new("templates", CheckStatus::Pass, format!("loading templates from `{}`", dir.display()));
    }
    DoctorCheck::new(
        "templates",
        CheckStatus::Warn,
        format!("`{}` not found; built-in templates will be used", dir.display()),
    )
}

/// Sms and voice list answers can only apologize without a destination.
fn check_destinations(readiness: &Readiness) -> DoctorCheck {
    let configured: Vec<&str> =
        readiness.destinations.iter().filter(|(_, configured)| *configured).map(|(name, _)| *name).collect();
    if configured.is_empty() {
        return DoctorCheck::new(
            "publish_destinations",
            CheckStatus::Fail,
            "no publish destination configured; enable storage.object_store or storage.file_share",
        );
    }
    DoctorCheck::new("publish_destinations", CheckStatus::Pass, format!("publishing via {}", configured.join(", ")))
}

fn optional_service(name: &'static str, configured: bool, ready: &str, disabled: &str) -> DoctorCheck {
    if configured {
        DoctorCheck::new(name, CheckStatus::Pass, ready)
    } else {
        DoctorCheck::new(name, CheckStatus::Warn, disabled)
    }
}

fn check_provider_keys(config: &AppConfig) -> DoctorCheck {
    let providers = &config.providers;
    let keys = [
        ("flickr_api_key", providers.flickr_api_key.is_some()),
        ("youtube_api_key", providers.youtube_api_key.is_some()),
        ("twitter_bearer_token", providers.twitter_bearer_token.is_some()),
        ("geocoding_api_key", providers.geocoding_api_key.is_some()),
        ("wordnik_api_key", providers.wordnik_api_key.is_some()),
        ("donorschoose_api_key", providers.donorschoose_api_key.is_some()),
    ];
    let missing: Vec<&str> = keys.iter().filter(|(_, present)| !present).map(|(name, _)| *name).collect();

    if missing.is_empty() {
        return DoctorCheck::new("provider_keys", CheckStatus::Pass, "every search provider has a key");
    }
    DoctorCheck::new(
        "provider_keys",
        CheckStatus::Warn,
        format!("missing {}; those searches will apologize", missing.join(", ")),
    )
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
