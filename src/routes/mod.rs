//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the websocket generator session, two small JSON/health
//! endpoints, and the static website. The landing page lives at `/`, the
//! generator page at `/generator.html`; anything not matched by an API route
//! falls through to the website directory.

pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::comic::EXAMPLE_PROMPTS;
use crate::state::AppState;

/// Full application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let website_service = ServeDir::new(&state.config.website_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/examples", get(examples))
        .route("/healthz", get(healthz))
        .fallback_service(website_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Sample stories for the generator page's example buttons.
async fn examples() -> Json<serde_json::Value> {
    Json(json!({ "prompts": EXAMPLE_PROMPTS }))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
