//! HTTP surface for the Wren agent: bootstrap wiring, the JSON and telephony
//! routes, the Tera fragment renderer and the health endpoint.

pub mod api;
pub mod bootstrap;
pub mod health;
pub mod templates;

use axum::Router;
use tower_http::services::ServeDir;

pub const ASSETS_DIR: &str = "assets";

/// Every public route, including `/health` and static `/assets`.
pub fn app_router(application: &bootstrap::Application) -> Router {
    api::router(application.state())
        .merge(health::router(application.readiness()))
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
}
