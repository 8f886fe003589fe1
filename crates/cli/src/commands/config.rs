use std::env;
use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use toml::Value;
use wren_core::config::{resolve_config_path, AppConfig, LoadOptions};

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

impl Field {
    fn new(key_path: &'static str, env_keys: &'static [&'static str], value: impl Into<String>) -> Self {
        Self { key_path, env_keys, value: value.into() }
    }
}

pub fn run() -> String {
    run_with_path(None)
}

pub fn run_with_path(explicit_path: Option<&Path>) -> String {
    let options = LoadOptions { config_path: explicit_path.map(Path::to_path_buf), ..LoadOptions::default() };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source =
            field_source(field.key_path, field.env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let agent = &config.agent;
    let providers = &config.providers;
    let object_store = &config.storage.object_store;
    let file_share = &config.storage.file_share;

    vec![
        Field::new("agent.name", &["WREN_AGENT_NAME"], agent.name.clone()),
        Field::new("agent.maker", &["WREN_AGENT_MAKER"], agent.maker.clone()),
        Field::new("agent.public_base_url", &["WREN_AGENT_PUBLIC_BASE_URL"], agent.public_base_url.clone()),
        Field::new(
            "agent.expose_provider_errors",
            &["WREN_AGENT_EXPOSE_PROVIDER_ERRORS"],
            agent.expose_provider_errors.to_string(),
        ),
        Field::new(
            "agent.placeholder_location",
            &["WREN_AGENT_PLACEHOLDER_LOCATION"],
            agent.placeholder_location.clone(),
        ),
        Field::new("agent.known_latitude", &["WREN_AGENT_KNOWN_LATITUDE"], optional(agent.known_latitude)),
        Field::new("agent.known_longitude", &["WREN_AGENT_KNOWN_LONGITUDE"], optional(agent.known_longitude)),
        Field::new("limits.image", &["WREN_LIMITS_IMAGE"], config.limits.image.to_string()),
        Field::new("limits.video", &["WREN_LIMITS_VIDEO"], config.limits.video.to_string()),
        Field::new("limits.tweet", &["WREN_LIMITS_TWEET"], config.limits.tweet.to_string()),
        Field::new("limits.cause", &["WREN_LIMITS_CAUSE"], config.limits.cause.to_string()),
        Field::new("providers.timeout_secs", &["WREN_PROVIDERS_TIMEOUT_SECS"], providers.timeout_secs.to_string()),
        Field::new("providers.flickr_api_key", &["WREN_FLICKR_API_KEY"], redact_optional(&providers.flickr_api_key)),
        Field::new(
            "providers.youtube_api_key",
            &["WREN_YOUTUBE_API_KEY"],
            redact_optional(&providers.youtube_api_key),
        ),
        Field::new(
            "providers.twitter_bearer_token",
            &["WREN_TWITTER_BEARER_TOKEN"],
            redact_optional(&providers.twitter_bearer_token),
        ),
        Field::new(
            "providers.geocoding_api_key",
            &["WREN_GEOCODING_API_KEY"],
            redact_optional(&providers.geocoding_api_key),
        ),
        Field::new(
            "providers.wordnik_api_key",
            &["WREN_WORDNIK_API_KEY"],
            redact_optional(&providers.wordnik_api_key),
        ),
        Field::new(
            "providers.donorschoose_api_key",
            &["WREN_DONORSCHOOSE_API_KEY"],
            redact_optional(&providers.donorschoose_api_key),
        ),
        Field::new("storage.object_store.enabled", &["WREN_OBJECT_STORE_ENABLED"], object_store.enabled.to_string()),
        Field::new("storage.object_store.bucket", &["WREN_OBJECT_STORE_BUCKET"], object_store.bucket.clone()),
        Field::new("storage.object_store.region", &["WREN_OBJECT_STORE_REGION"], object_store.region.clone()),
        Field::new(
            "storage.object_store.endpoint",
            &["WREN_OBJECT_STORE_ENDPOINT"],
            object_store.endpoint.as_deref().unwrap_or("<unset>"),
        ),
        Field::new(
            "storage.object_store.secret_access_key",
            &["WREN_OBJECT_STORE_SECRET_ACCESS_KEY"],
            redact_secret(&object_store.secret_access_key),
        ),
        Field::new("storage.file_share.enabled", &["WREN_FILE_SHARE_ENABLED"], file_share.enabled.to_string()),
        Field::new(
            "storage.file_share.access_token",
            &["WREN_FILE_SHARE_ACCESS_TOKEN"],
            redact_secret(&file_share.access_token),
        ),
        Field::new("storage.file_share.folder", &["WREN_FILE_SHARE_FOLDER"], file_share.folder.clone()),
        Field::new("shortener.enabled", &["WREN_SHORTENER_ENABLED"], config.shortener.enabled.to_string()),
        Field::new(
            "shortener.access_token",
            &["WREN_SHORTENER_ACCESS_TOKEN"],
            redact_secret(&config.shortener.access_token),
        ),
        Field::new("sms.enabled", &["WREN_SMS_ENABLED"], config.sms.enabled.to_string()),
        Field::new("sms.account_sid", &["WREN_SMS_ACCOUNT_SID"], config.sms.account_sid.clone()),
        Field::new("sms.auth_token", &["WREN_SMS_AUTH_TOKEN"], redact_secret(&config.sms.auth_token)),
        Field::new("sms.from_number", &["WREN_SMS_FROM_NUMBER"], config.sms.from_number.clone()),
        Field::new("server.bind_address", &["WREN_SERVER_BIND_ADDRESS"], config.server.bind_address.clone()),
        Field::new("server.port", &["WREN_SERVER_PORT"], config.server.port.to_string()),
        Field::new(
            "server.health_check_port",
            &["WREN_SERVER_HEALTH_CHECK_PORT"],
            config.server.health_check_port.to_string(),
        ),
        Field::new(
            "server.graceful_shutdown_secs",
            &["WREN_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        Field::new("logging.level", &["WREN_LOGGING_LEVEL", "WREN_LOG_LEVEL"], config.logging.level.clone()),
        Field::new(
            "logging.format",
            &["WREN_LOGGING_FORMAT", "WREN_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn optional(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "<unset>".to_string())
}

fn redact_optional(secret: &Option<SecretString>) -> String {
    secret.as_ref().map(redact_secret).unwrap_or_else(|| "<unset>".to_string())
}

/// Shows only the last four characters of secrets long enough to keep the rest hidden.
fn redact_secret(secret: &SecretString) -> String {
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let characters: Vec<char> = trimmed.chars().collect();
    if characters.len() < 12 {
        return "<redacted>".to_string();
    }
    let tail: String = characters[characters.len() - 4..].iter().collect();
    format!("***{tail}")
}
