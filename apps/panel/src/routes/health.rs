use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the host and sign-in details the panel shows.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-panel",
        "host_environment": state.config.host_environment,
        "demo_mode": state.config.demo_mode,
        "authenticated": state.tokens.is_authenticated().await,
    }))
}
