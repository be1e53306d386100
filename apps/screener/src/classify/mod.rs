// Classification front-ends: multipart batch upload and the interactive text form.
// Both are thin wrappers; every document goes through the shared `Pipeline`.

pub mod handlers;

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::document::Document;
use crate::pipeline::{ClassificationOutcome, Pipeline};

/// Runs the pipeline off the async executor; PDF parsing is CPU-bound.
pub async fn classify_document(
    pipeline: Arc<Pipeline>,
    document: Document,
) -> Result<ClassificationOutcome, AppError> {
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pipeline: {e}")))??;
    Ok(outcome)
}
