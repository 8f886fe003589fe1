use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use wren_agent::{Agent, AgentError};
use wren_core::config::{AppConfig, ConfigError, LoadOptions};
use wren_providers::{ProviderSet, ProviderSetupError};

use crate::api::AppState;
use crate::health::Readiness;
use crate::templates::TeraRenderer;

pub const TEMPLATE_DIR: &str = "templates";

pub struct Application {
    pub config: AppConfig,
    pub agent: Arc<Agent>,
    pub providers: ProviderSet,
}

impl Application {
    pub fn state(&self) -> AppState {
        AppState {
            agent: self.agent.clone(),
            artifacts: self.providers.artifacts.clone(),
            sms: self.providers.sms.clone(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness::from_providers(&self.providers)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("provider wiring failed: {0}")]
    Providers(#[from] ProviderSetupError),
    #[error("agent construction failed: {0}")]
    Agent(#[from] AgentError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", correlation_id = "bootstrap", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Wires an already loaded config into a ready application.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let renderer = Arc::new(TeraRenderer::new(TEMPLATE_DIR));
    let providers = ProviderSet::from_config(&config, renderer)?;
    let agent = Agent::new(&config, providers.providers.clone())?;
    info!(
        event_name = "system.bootstrap.agent_ready",
        correlation_id = "bootstrap",
        agent = %agent.persona().display_name,
        "agent pipeline initialized"
    );

    Ok(Application { config, agent: Arc::new(agent), providers })
}
