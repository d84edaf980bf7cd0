pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    let analyze = post(handlers::handle_analyze).fallback(handlers::handle_method_not_allowed);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // JSON + base64 upload
        .route("/api/analyze-resume", analyze.clone())
        // multipart upload
        .route("/v1/analyze_resume/", analyze)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
