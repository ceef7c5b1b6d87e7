pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::rubric::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form data
        .route("/api/v1/criteria", get(handlers::handle_list_criteria))
        .route("/api/v1/settings", get(handlers::handle_settings))
        // Rubric API
        .route("/api/v1/rubrics/prompt", post(handlers::handle_preview_prompt))
        .route("/api/v1/rubrics/generate", post(handlers::handle_generate))
        .route("/api/v1/rubrics/parse", post(handlers::handle_parse))
        .route("/api/v1/rubrics/export", post(handlers::handle_export))
        .route(
            "/api/v1/rubrics/export/markdown",
            post(handlers::handle_export_markdown),
        )
        .with_state(state)
}
