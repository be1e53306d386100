//! Résumé classification pipeline.
//!
//! Extract → normalize → vectorize → classify → resolve, strictly in that order.
//! Each stage takes only the previous stage's output. The two model artifacts are
//! loaded once at startup and owned by [`Pipeline`], which is shared read-only
//! across requests behind an `Arc`.

pub mod category;
pub mod classifier;
pub mod extract;
pub mod features;
pub mod normalize;
pub mod vectorizer;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::document::Document;
use crate::pipeline::category::{resolve, CategoryId};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::vectorizer::TfidfVectorizer;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    // Latin-1 fallback makes text decoding total; kept for extractors that can fail
    #[allow(dead_code)]
    #[error("document could not be decoded as text")]
    DecodeFailure,

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("failed to load {artifact}: {reason}")]
    ModelLoad { artifact: String, reason: String },

    #[error("feature dimension mismatch: model expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl PipelineError {
    /// Fatal errors point at a broken deployment (bad or skewed model artifacts),
    /// not at a bad input document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::ModelLoad { .. } | PipelineError::DimensionMismatch { .. }
        )
    }

    pub(crate) fn model_load(artifact: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::ModelLoad {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }
}

/// Everything the shell needs to render a classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationOutcome {
    pub extracted_text: String,
    pub cleaned_text: String,
    pub category_id: CategoryId,
    pub category: &'static str,
}

/// Owns both loaded models. Construct once at startup, share via `Arc<Pipeline>`.
#[derive(Debug)]
pub struct Pipeline {
    vectorizer: TfidfVectorizer,
    classifier: Classifier,
}

impl Pipeline {
    /// Pairs a vectorizer with a classifier, refusing version-skewed models.
    pub fn new(vectorizer: TfidfVectorizer, classifier: Classifier) -> Result<Self, PipelineError> {
        if vectorizer.dimension() != classifier.n_features() {
            return Err(PipelineError::DimensionMismatch {
                expected: classifier.n_features(),
                actual: vectorizer.dimension(),
            });
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Loads both JSON artifacts from disk.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self, PipelineError> {
        let vectorizer = TfidfVectorizer::load(vectorizer_path)?;
        let classifier = Classifier::load(classifier_path)?;
        info!(
            vocabulary = vectorizer.dimension(),
            classes = classifier.class_count(),
            backend = classifier.backend(),
            "Models loaded"
        );
        Self::new(vectorizer, classifier)
    }

    #[cfg(test)]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    #[cfg(test)]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Runs a single document through every stage.
    pub fn run(&self, document: &Document) -> Result<ClassificationOutcome, PipelineError> {
        debug!(
            format = %document.format(),
            bytes = document.len(),
            "Extracting document text"
        );
        let extracted_text = extract::extract(document)?;
        debug!(chars = extracted_text.chars().count(), "Extracted text");

        let cleaned_text = normalize::normalize(&extracted_text);
        debug!(cleaned = %cleaned_text, "Normalized text");

        let features = self.vectorizer.vectorize(&cleaned_text)?;
        debug!(nnz = features.nnz(), dimension = features.dimension(), "Vectorized");

        let category_id = self.classifier.classify(&features)?;
        let category = resolve(category_id);
        info!(category_id, category, "Predicted category");

        Ok(ClassificationOutcome {
            extracted_text,
            cleaned_text,
            category_id,
            category,
        })
    }
}

/// Reads and deserializes a JSON model artifact.
pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let artifact = path.display().to_string();
    let raw = std::fs::read(path).map_err(|e| PipelineError::model_load(&artifact, e))?;
    serde_json::from_slice(&raw).map_err(|e| PipelineError::model_load(artifact, e))
}
