use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::intent::Coordinates;

pub const DEFAULT_CONFIG_FILE: &str = "wren.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub limits: LimitsConfig,
    pub providers: ProvidersConfig,
    pub storage: StorageConfig,
    pub shortener: ShortenerConfig,
    pub sms: SmsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub name: String,
    pub maker: String,
    pub maker_address: String,
    pub maker_url: String,
    pub public_base_url: String,
    pub expose_provider_errors: bool,
    pub placeholder_location: String,
    pub known_latitude: Option<f64>,
    pub known_longitude: Option<f64>,
}

impl AgentConfig {
    pub fn known_coordinates(&self) -> Option<Coordinates> {
        match (self.known_latitude, self.known_longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Per-type default result counts used when a query names no quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitsConfig {
    pub image: u32,
    pub video: u32,
    pub tweet: u32,
    pub cause: u32,
}

#[derive(Clone, Debug)]
pub struct ProvidersConfig {
    pub timeout_secs: u64,
    pub flickr_api_key: Option<SecretString>,
    pub youtube_api_key: Option<SecretString>,
    pub twitter_bearer_token: Option<SecretString>,
    pub geocoding_api_key: Option<SecretString>,
    pub wordnik_api_key: Option<SecretString>,
    pub donorschoose_api_key: Option<SecretString>,
    pub answers_base_url: String,
    pub eco_base_url: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub object_store: ObjectStoreConfig,
    pub file_share: FileShareConfig,
}

#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    pub enabled: bool,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl ObjectStoreConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled
            && !self.bucket.trim().is_empty()
            && !self.access_key_id.trim().is_empty()
            && !self.secret_access_key.expose_secret().trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct FileShareConfig {
    pub enabled: bool,
    pub access_token: SecretString,
    pub folder: String,
}

impl FileShareConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.access_token.expose_secret().trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ShortenerConfig {
    pub enabled: bool,
    pub access_token: SecretString,
}

impl ShortenerConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.access_token.expose_secret().trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct SmsConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from_number: String,
}

impl SmsConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled
            && !self.account_sid.trim().is_empty()
            && !self.auth_token.expose_secret().trim().is_empty()
            && !self.from_number.trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub agent_name: Option<String>,
    pub public_base_url: Option<String>,
    pub expose_provider_errors: Option<bool>,
    pub known_latitude: Option<f64>,
    pub known_longitude: Option<f64>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig {
                name: "wren".to_string(),
                maker: "Wren Contributors".to_string(),
                maker_address: "221B Baker Street, London".to_string(),
                maker_url: "https://github.com/wren-agent/wren".to_string(),
                public_base_url: "http://127.0.0.1:8080".to_string(),
                expose_provider_errors: false,
                placeholder_location: "Basse-Terre".to_string(),
                known_latitude: None,
                known_longitude: None,
            },
            limits: LimitsConfig { image: 50, video: 20, tweet: 50, cause: 10 },
            providers: ProvidersConfig {
                timeout_secs: 10,
                flickr_api_key: None,
                youtube_api_key: None,
                twitter_bearer_token: None,
                geocoding_api_key: None,
                wordnik_api_key: None,
                donorschoose_api_key: None,
                answers_base_url: "https://api.duckduckgo.com".to_string(),
                eco_base_url: "https://data.epa.gov/efservice".to_string(),
            },
            storage: StorageConfig {
                object_store: ObjectStoreConfig {
                    enabled: false,
                    bucket: String::new(),
                    region: "us-east-1".to_string(),
                    endpoint: None,
                    access_key_id: String::new(),
                    secret_access_key: String::new().into(),
                },
                file_share: FileShareConfig {
                    enabled: false,
                    access_token: String::new().into(),
                    folder: "/wren".to_string(),
                },
            },
            shortener: ShortenerConfig { enabled: false, access_token: String::new().into() },
            sms: SmsConfig {
                enabled: false,
                account_sid: String::new(),
                auth_token: String::new().into(),
                from_number: String::new(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                health_check_port: 8081,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(agent) = patch.agent {
            if let Some(name) = agent.name {
                self.agent.name = name;
            }
            if let Some(maker) = agent.maker {
                self.agent.maker = maker;
            }
            if let Some(maker_address) = agent.maker_address {
                self.agent.maker_address = maker_address;
            }
            if let Some(maker_url) = agent.maker_url {
                self.agent.maker_url = maker_url;
            }
            if let Some(public_base_url) = agent.public_base_url {
                self.agent.public_base_url = public_base_url;
            }
            if let Some(expose_provider_errors) = agent.expose_provider_errors {
                self.agent.expose_provider_errors = expose_provider_errors;
            }
            if let Some(placeholder_location) = agent.placeholder_location {
                self.agent.placeholder_location = placeholder_location;
            }
            if let Some(known_latitude) = agent.known_latitude {
                self.agent.known_latitude = Some(known_latitude);
            }
            if let Some(known_longitude) = agent.known_longitude {
                self.agent.known_longitude = Some(known_longitude);
            }
        }

        if let Some(limits) = patch.limits {
            if let Some(image) = limits.image {
                self.limits.image = image;
            }
            if let Some(video) = limits.video {
                self.limits.video = video;
            }
            if let Some(tweet) = limits.tweet {
                self.limits.tweet = tweet;
            }
            if let Some(cause) = limits.cause {
                self.limits.cause = cause;
            }
        }

        if let Some(providers) = patch.providers {
            if let Some(timeout_secs) = providers.timeout_secs {
                self.providers.timeout_secs = timeout_secs;
            }
            if let Some(value) = providers.flickr_api_key {
                self.providers.flickr_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.youtube_api_key {
                self.providers.youtube_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.twitter_bearer_token {
                self.providers.twitter_bearer_token = Some(secret_value(value));
            }
            if let Some(value) = providers.geocoding_api_key {
                self.providers.geocoding_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.wordnik_api_key {
                self.providers.wordnik_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.donorschoose_api_key {
                self.providers.donorschoose_api_key = Some(secret_value(value));
            }
            if let Some(answers_base_url) = providers.answers_base_url {
                self.providers.answers_base_url = answers_base_url;
            }
            if let Some(eco_base_url) = providers.eco_base_url {
                self.providers.eco_base_url = eco_base_url;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(object_store) = storage.object_store {
                let target = &mut self.storage.object_store;
                if let Some(enabled) = object_store.enabled {
                    target.enabled = enabled;
                }
                if let Some(bucket) = object_store.bucket {
                    target.bucket = bucket;
                }
                if let Some(region) = object_store.region {
                    target.region = region;
                }
                if let Some(endpoint) = object_store.endpoint {
                    target.endpoint = Some(endpoint);
                }
                if let Some(access_key_id) = object_store.access_key_id {
                    target.access_key_id = access_key_id;
                }
                if let Some(value) = object_store.secret_access_key {
                    target.secret_access_key = secret_value(value);
                }
            }

            if let Some(file_share) = storage.file_share {
                let target = &mut self.storage.file_share;
                if let Some(enabled) = file_share.enabled {
                    target.enabled = enabled;
                }
                if let Some(value) = file_share.access_token {
                    target.access_token = secret_value(value);
                }
                if let Some(folder) = file_share.folder {
                    target.folder = folder;
                }
            }
        }

        if let Some(shortener) = patch.shortener {
            if let Some(enabled) = shortener.enabled {
                self.shortener.enabled = enabled;
            }
            if let Some(value) = shortener.access_token {
                self.shortener.access_token = secret_value(value);
            }
        }

        if let Some(sms) = patch.sms {
            if let Some(enabled) = sms.enabled {
                self.sms.enabled = enabled;
            }
            if let Some(account_sid) = sms.account_sid {
                self.sms.account_sid = account_sid;
            }
            if let Some(value) = sms.auth_token {
                self.sms.auth_token = secret_value(value);
            }
            if let Some(from_number) = sms.from_number {
                self.sms.from_number = from_number;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WREN_AGENT_NAME") {
            self.agent.name = value;
        }
        if let Some(value) = read_env("WREN_AGENT_MAKER") {
            self.agent.maker = value;
        }
        if let Some(value) = read_env("WREN_AGENT_MAKER_ADDRESS") {
            self.agent.maker_address = value;
        }
        if let Some(value) = read_env("WREN_AGENT_MAKER_URL") {
            self.agent.maker_url = value;
        }
        if let Some(value) = read_env("WREN_AGENT_PUBLIC_BASE_URL") {
            self.agent.public_base_url = value;
        }
        if let Some(value) = read_env("WREN_AGENT_EXPOSE_PROVIDER_ERRORS") {
            self.agent.expose_provider_errors =
                parse_bool("WREN_AGENT_EXPOSE_PROVIDER_ERRORS", &value)?;
        }
        if let Some(value) = read_env("WREN_AGENT_PLACEHOLDER_LOCATION") {
            self.agent.placeholder_location = value;
        }
        if let Some(value) = read_env("WREN_AGENT_KNOWN_LATITUDE") {
            self.agent.known_latitude = Some(parse_f64("WREN_AGENT_KNOWN_LATITUDE", &value)?);
        }
        if let Some(value) = read_env("WREN_AGENT_KNOWN_LONGITUDE") {
            self.agent.known_longitude = Some(parse_f64("WREN_AGENT_KNOWN_LONGITUDE", &value)?);
        }

        if let Some(value) = read_env("WREN_LIMITS_IMAGE") {
            self.limits.image = parse_u32("WREN_LIMITS_IMAGE", &value)?;
        }
        if let Some(value) = read_env("WREN_LIMITS_VIDEO") {
            self.limits.video = parse_u32("WREN_LIMITS_VIDEO", &value)?;
        }
        if let Some(value) = read_env("WREN_LIMITS_TWEET") {
            self.limits.tweet = parse_u32("WREN_LIMITS_TWEET", &value)?;
        }
        if let Some(value) = read_env("WREN_LIMITS_CAUSE") {
            self.limits.cause = parse_u32("WREN_LIMITS_CAUSE", &value)?;
        }

        if let Some(value) = read_env("WREN_PROVIDERS_TIMEOUT_SECS") {
            self.providers.timeout_secs = parse_u64("WREN_PROVIDERS_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("WREN_FLICKR_API_KEY") {
            self.providers.flickr_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WREN_YOUTUBE_API_KEY") {
            self.providers.youtube_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WREN_TWITTER_BEARER_TOKEN") {
            self.providers.twitter_bearer_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("WREN_GEOCODING_API_KEY") {
            self.providers.geocoding_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WREN_WORDNIK_API_KEY") {
            self.providers.wordnik_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WREN_DONORSCHOOSE_API_KEY") {
            self.providers.donorschoose_api_key = Some(secret_value(value));
        }

        if let Some(value) = read_env("WREN_OBJECT_STORE_ENABLED") {
            self.storage.object_store.enabled = parse_bool("WREN_OBJECT_STORE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("WREN_OBJECT_STORE_BUCKET") {
            self.storage.object_store.bucket = value;
        }
        if let Some(value) = read_env("WREN_OBJECT_STORE_REGION") {
            self.storage.object_store.region = value;
        }
        if let Some(value) = read_env("WREN_OBJECT_STORE_ENDPOINT") {
            self.storage.object_store.endpoint = Some(value);
        }
        if let Some(value) = read_env("WREN_OBJECT_STORE_ACCESS_KEY_ID") {
            self.storage.object_store.access_key_id = value;
        }
        if let Some(value) = read_env("WREN_OBJECT_STORE_SECRET_ACCESS_KEY") {
            self.storage.object_store.secret_access_key = secret_value(value);
        }

        if let Some(value) = read_env("WREN_FILE_SHARE_ENABLED") {
            self.storage.file_share.enabled = parse_bool("WREN_FILE_SHARE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("WREN_FILE_SHARE_ACCESS_TOKEN") {
            self.storage.file_share.access_token = secret_value(value);
        }
        if let Some(value) = read_env("WREN_FILE_SHARE_FOLDER") {
            self.storage.file_share.folder = value;
        }

        if let Some(value) = read_env("WREN_SHORTENER_ENABLED") {
            self.shortener.enabled = parse_bool("WREN_SHORTENER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("WREN_SHORTENER_ACCESS_TOKEN") {
            self.shortener.access_token = secret_value(value);
        }

        if let Some(value) = read_env("WREN_SMS_ENABLED") {
            self.sms.enabled = parse_bool("WREN_SMS_ENABLED", &value)?;
        }
        if let Some(value) = read_env("WREN_SMS_ACCOUNT_SID") {
            self.sms.account_sid = value;
        }
        if let Some(value) = read_env("WREN_SMS_AUTH_TOKEN") {
            self.sms.auth_token = secret_value(value);
        }
        if let Some(value) = read_env("WREN_SMS_FROM_NUMBER") {
            self.sms.from_number = value;
        }

        if let Some(value) = read_env("WREN_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("WREN_SERVER_PORT") {
            self.server.port = parse_u16("WREN_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("WREN_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port = parse_u16("WREN_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("WREN_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("WREN_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("WREN_LOGGING_LEVEL").or_else(|| read_env("WREN_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("WREN_LOGGING_FORMAT").or_else(|| read_env("WREN_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(agent_name) = overrides.agent_name {
            self.agent.name = agent_name;
        }
        if let Some(public_base_url) = overrides.public_base_url {
            self.agent.public_base_url = public_base_url;
        }
        if let Some(expose_provider_errors) = overrides.expose_provider_errors {
            self.agent.expose_provider_errors = expose_provider_errors;
        }
        if let Some(known_latitude) = overrides.known_latitude {
            self.agent.known_latitude = Some(known_latitude);
        }
        if let Some(known_longitude) = overrides.known_longitude {
            self.agent.known_longitude = Some(known_longitude);
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_agent(&self.agent)?;
        validate_limits(&self.limits)?;
        validate_providers(&self.providers)?;
        validate_storage(&self.storage)?;
        validate_shortener(&self.shortener)?;
        validate_sms(&self.sms)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Path of the config file `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    let name = agent.name.trim();
    if name.is_empty() || !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return Err(ConfigError::Validation(
            "agent.name must be a single word of letters, digits or underscores".to_string(),
        ));
    }

    if !is_http_url(&agent.public_base_url) {
        return Err(ConfigError::Validation(
            "agent.public_base_url must start with http:// or https://".to_string(),
        ));
    }

    if !agent.maker_url.is_empty() && !is_http_url(&agent.maker_url) {
        return Err(ConfigError::Validation(
            "agent.maker_url must start with http:// or https://".to_string(),
        ));
    }

    if agent.placeholder_location.trim().is_empty() {
        return Err(ConfigError::Validation(
            "agent.placeholder_location must not be empty".to_string(),
        ));
    }

    match (agent.known_latitude, agent.known_longitude) {
        (Some(latitude), Some(longitude)) => {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(ConfigError::Validation(
                    "agent.known_latitude must be in range -90..=90".to_string(),
                ));
            }
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(ConfigError::Validation(
                    "agent.known_longitude must be in range -180..=180".to_string(),
                ));
            }
        }
        (None, None) => {}
        _ => {
            return Err(ConfigError::Validation(
                "agent.known_latitude and agent.known_longitude must be set together".to_string(),
            ))
        }
    }

    Ok(())
}

fn validate_limits(limits: &LimitsConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("limits.image", limits.image),
        ("limits.video", limits.video),
        ("limits.tweet", limits.tweet),
        ("limits.cause", limits.cause),
    ] {
        if value == 0 || value > 500 {
            return Err(ConfigError::Validation(format!("{key} must be in range 1..=500")));
        }
    }
    Ok(())
}

fn validate_providers(providers: &ProvidersConfig) -> Result<(), ConfigError> {
    if providers.timeout_secs == 0 || providers.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "providers.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    if !is_http_url(&providers.answers_base_url) || !is_http_url(&providers.eco_base_url) {
        return Err(ConfigError::Validation(
            "providers.answers_base_url and providers.eco_base_url must be http(s) URLs"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    let object_store = &storage.object_store;
    if object_store.enabled && !object_store.is_configured() {
        return Err(ConfigError::Validation(
            "storage.object_store.enabled is true but bucket, access_key_id or secret_access_key is missing"
                .to_string(),
        ));
    }
    if object_store.enabled && object_store.region.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.object_store.region must not be empty".to_string(),
        ));
    }
    if let Some(endpoint) = &object_store.endpoint {
        if !is_http_url(endpoint) {
            return Err(ConfigError::Validation(
                "storage.object_store.endpoint must start with http:// or https://".to_string(),
            ));
        }
    }

    let file_share = &storage.file_share;
    if file_share.enabled && !file_share.is_configured() {
        return Err(ConfigError::Validation(
            "storage.file_share.enabled is true but access_token is missing".to_string(),
        ));
    }
    if !file_share.folder.starts_with('/') {
        return Err(ConfigError::Validation(
            "storage.file_share.folder must be an absolute path starting with `/`".to_string(),
        ));
    }

    Ok(())
}

fn validate_shortener(shortener: &ShortenerConfig) -> Result<(), ConfigError> {
    if shortener.enabled && !shortener.is_configured() {
        return Err(ConfigError::Validation(
            "shortener.enabled is true but access_token is missing".to_string(),
        ));
    }
    Ok(())
}

fn validate_sms(sms: &SmsConfig) -> Result<(), ConfigError> {
    if sms.enabled && !sms.is_configured() {
        return Err(ConfigError::Validation(
            "sms.enabled is true but account_sid, auth_token or from_number is missing"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    agent: Option<AgentPatch>,
    limits: Option<LimitsPatch>,
    providers: Option<ProvidersPatch>,
    storage: Option<StoragePatch>,
    shortener: Option<ShortenerPatch>,
    sms: Option<SmsPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    name: Option<String>,
    maker: Option<String>,
    maker_address: Option<String>,
    maker_url: Option<String>,
    public_base_url: Option<String>,
    expose_provider_errors: Option<bool>,
    placeholder_location: Option<String>,
    known_latitude: Option<f64>,
    known_longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsPatch {
    image: Option<u32>,
    video: Option<u32>,
    tweet: Option<u32>,
    cause: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvidersPatch {
    timeout_secs: Option<u64>,
    flickr_api_key: Option<String>,
    youtube_api_key: Option<String>,
    twitter_bearer_token: Option<String>,
    geocoding_api_key: Option<String>,
    wordnik_api_key: Option<String>,
    donorschoose_api_key: Option<String>,
    answers_base_url: Option<String>,
    eco_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    object_store: Option<ObjectStorePatch>,
    file_share: Option<FileSharePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectStorePatch {
    enabled: Option<bool>,
    bucket: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileSharePatch {
    enabled: Option<bool>,
    access_token: Option<String>,
    folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ShortenerPatch {
    enabled: Option<bool>,
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SmsPatch {
    enabled: Option<bool>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
