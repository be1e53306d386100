use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Both models, loaded once at startup and read-only afterwards.
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
