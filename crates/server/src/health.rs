use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use wren_providers::ProviderSet;

/// Which outbound services this deployment can reach. Captured once at
/// bootstrap; configuration does not change while the process runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Readiness {
    pub destinations: Vec<(&'static str, bool)>,
    pub shortener: bool,
    pub sms: bool,
}

impl Readiness {
    pub fn from_providers(set: &ProviderSet) -> Self {
        Self {
            destinations: set
                .providers
                .destinations
                .iter()
                .map(|destination| (destination.name(), destination.is_configured()))
                .collect(),
            shortener: set.providers.shortener.is_configured(),
            sms: set.sms.is_configured(),
        }
    }
}

#[derive(Clone)]
pub struct HealthState {
    readiness: Arc<Readiness>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub storage: HealthCheck,
    pub shortener: HealthCheck,
    pub sms: HealthCheck,
    pub checked_at: String,
}

pub fn router(readiness: Readiness) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { readiness: Arc::new(readiness) })
}

pub async fn spawn(bind_address: &str, port: u16, readiness: Readiness) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(readiness)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let readiness = &state.readiness;
    let storage = storage_check(readiness);
    let ready = storage.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck { status: "ready", detail: "wren-server runtime initialized".to_string() },
        storage,
        shortener: optional_check(readiness.shortener, "links are shortened", "links are sent unshortened"),
        sms: optional_check(readiness.sms, "voice replies are texted back", "voice replies are dropped"),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Without a publish destination, list answers on sms and voice can only apologize.
fn storage_check(readiness: &Readiness) -> HealthCheck {
    let configured: Vec<&str> =
        readiness.destinations.iter().filter(|(_, configured)| *configured).map(|(name, _)| *name).collect();
    if configured.is_empty() {
        return HealthCheck {
            status: "degraded",
            detail: "no publish destination configured; sms and voice list answers will apologize".to_string(),
        };
    }
    HealthCheck { status: "ready", detail: format!("publishing via {}", configured.join(", ")) }
}

fn optional_check(configured: bool, ready_detail: &str, disabled_detail: &str) -> HealthCheck {
    if configured {
        HealthCheck { status: "ready", detail: ready_detail.to_string() }
    } else {
        HealthCheck { status: "disabled", detail: disabled_detail.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState, Readiness};

    fn state(destinations: Vec<(&'static str, bool)>) -> State<HealthState> {
        State(HealthState { readiness: Arc::new(Readiness { destinations, shortener: false, sms: true }) })
    }

    #[tokio::test]
    async fn health_returns_ready_when_a_destination_is_configured() {
        let (status, Json(payload)) = health(state(vec![("object_store", false), ("file_share", true)])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.storage.detail, "publishing via file_share");
        assert_eq!(payload.shortener.status, "disabled");
        assert_eq!(payload.sms.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_without_destinations() {
        let (status, Json(payload)) = health(state(vec![("object_store", false), ("file_share", false)])).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.storage.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
