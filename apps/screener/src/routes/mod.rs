pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::classify::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Batch upload: one or more multipart `file` parts
        .route("/api/v1/classify", post(handlers::handle_classify_upload))
        // Interactive form: raw résumé text as JSON
        .route("/api/v1/classify/text", post(handlers::handle_classify_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
