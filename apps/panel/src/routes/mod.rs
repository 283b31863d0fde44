pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::handlers as backend;
use crate::redline::handlers as redline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Redline API (stateless, document in every request)
        .route("/api/v1/redline/render", post(redline::handle_render))
        .route("/api/v1/redline/apply", post(redline::handle_apply))
        .route("/api/v1/redline/clean", post(redline::handle_clean))
        // Backend proxy
        .route("/api/v1/review", post(backend::handle_review))
        .route("/api/v1/questions", post(backend::handle_questions))
        .route(
            "/api/v1/job-description",
            post(backend::handle_job_description),
        )
        .route("/api/v1/resume", get(backend::handle_resume))
        .with_state(state)
}
