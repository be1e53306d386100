//! Axum route handlers for the classification API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::classify::classify_document;
use crate::errors::{describe_pipeline_error, AppError};
use crate::models::document::{Document, DocumentFormat};
use crate::pipeline::{ClassificationOutcome, PipelineError};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FileError {
    pub code: &'static str,
    pub message: String,
}

/// Result for one uploaded file. Exactly one of `outcome` / `error` is set.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ClassificationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<FileResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/classify/text
///
/// Classifies pasted résumé text. Empty text is accepted and classified like any other.
pub async fn handle_classify_text(
    State(state): State<AppState>,
    Json(request): Json<ClassifyTextRequest>,
) -> Result<Json<ClassificationOutcome>, AppError> {
    let document = Document::new(request.text.into_bytes(), DocumentFormat::Text);
    let outcome = classify_document(state.pipeline.clone(), document).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/classify
///
/// Classifies every multipart `file` part. A bad document only fails its own entry;
/// a deployment error (model skew) fails the whole request.
pub async fn handle_classify_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let mut results = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let format = resolve_format(&filename, field.content_type());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file '{filename}': {e}")))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "File received");

        let outcome = match format {
            Ok(format) => classify_document(state.pipeline.clone(), Document::new(data, format)).await,
            Err(e) => Err(e.into()),
        };

        results.push(match outcome {
            Ok(outcome) => FileResult {
                filename,
                outcome: Some(outcome),
                error: None,
            },
            Err(AppError::Pipeline(e)) if !e.is_fatal() => {
                tracing::warn!(filename = %filename, error = %e, "Document rejected");
                let (_, code, message) = describe_pipeline_error(&e);
                FileResult {
                    filename,
                    outcome: None,
                    error: Some(FileError { code, message }),
                }
            }
            Err(e) => return Err(e),
        });
    }

    if results.is_empty() {
        tracing::warn!("Classify request with no file");
        return Err(AppError::Validation("No file uploaded".to_string()));
    }

    tracing::info!(files = results.len(), "Batch classified");
    Ok(Json(BatchResponse { results }))
}

/// Filename extension first, then the part's declared content type.
fn resolve_format(
    filename: &str,
    content_type: Option<&str>,
) -> Result<DocumentFormat, PipelineError> {
    DocumentFormat::from_filename(filename).or_else(|e| match content_type {
        Some(mime) => DocumentFormat::from_mime(mime).map_err(|_| e),
        None => Err(e),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::pipeline::fixtures;
    use crate::routes::build_router;

    const BOUNDARY: &str = "screener-test-boundary";

    fn app() -> Router {
        build_router(AppState {
            pipeline: Arc::new(fixtures::pipeline()),
            config: Config {
                vectorizer_model_path: PathBuf::from("unused"),
                classifier_model_path: PathBuf::from("unused"),
                port: 0,
                rust_log: "info".to_string(),
                max_upload_bytes: 1024 * 1024,
            },
        })
    }

    fn multipart_body(parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content_type, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn upload(parts: &[(&str, &str, &str, &[u8])]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/classify")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn text_form(text: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/classify/text")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "text": text }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener");
    }

    #[tokio::test]
    async fn test_text_form_classifies() {
        let (status, body) = send(text_form("Python developer, Django & Flask")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "Python Developer");
        assert_eq!(body["category_id"], 20);
        assert_eq!(body["extracted_text"], "Python developer, Django & Flask");
        assert_eq!(body["cleaned_text"], "Python developer Django Flask");
    }

    #[tokio::test]
    async fn test_text_form_accepts_empty_text() {
        let (status, body) = send(text_form("")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleaned_text"], "");
        assert_eq!(body["category"], "Advocate");
    }

    #[tokio::test]
    async fn test_upload_batch_mixed_results() {
        let pdf = fixtures::pdf_with_pages(&["Experienced Java Developer"]);
        let request = upload(&[
            ("file", "data.txt", "text/plain", b"data science and more data"),
            ("file", "cv.pdf", "application/pdf", &pdf),
            ("file", "cv.docx", "application/octet-stream", b"PK\x03\x04"),
            ("file", "broken.pdf", "application/pdf", b"not a pdf"),
        ]);
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);

        assert_eq!(results[0]["filename"], "data.txt");
        assert_eq!(results[0]["outcome"]["category"], "Data Science");
        assert!(results[0].get("error").is_none());

        assert_eq!(results[1]["outcome"]["category"], "Java Developer");

        assert_eq!(results[2]["error"]["code"], "UNSUPPORTED_FORMAT");
        assert!(results[2].get("outcome").is_none());

        assert_eq!(results[3]["error"]["code"], "UNPROCESSABLE_DOCUMENT");
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_content_type() {
        let request = upload(&[("file", "resume", "text/plain", b"court lawyer")]);
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["outcome"]["category"], "Advocate");
    }

    #[tokio::test]
    async fn test_upload_latin1_text() {
        let request = upload(&[("file", "cv.txt", "text/plain", b"Java d\xe9veloppeur java")]);
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        let outcome = &body["results"][0]["outcome"];
        assert_eq!(outcome["extracted_text"], "Java développeur java");
        assert_eq!(outcome["category"], "Java Developer");
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let request = upload(&[("comment", "note.txt", "text/plain", b"hello")]);
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_resolve_format_prefers_extension() {
        assert_eq!(
            resolve_format("cv.pdf", Some("text/plain")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            resolve_format("cv", Some("application/pdf")).unwrap(),
            DocumentFormat::Pdf
        );
        assert!(matches!(
            resolve_format("cv.doc", Some("application/msword")),
            Err(PipelineError::UnsupportedFormat(tag)) if tag == "doc"
        ));
    }
}
