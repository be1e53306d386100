//! Classifier: maps a feature vector to a category id with a pre-trained decision model.
//!
//! Backends implement [`DecisionModel`]; [`Classifier`] owns one behind a `Box<dyn _>`
//! and enforces the input dimension. Two artifact kinds are supported:
//! - `linear`: one weight row + intercept per class, argmax of the decision scores.
//! - `k_neighbors`: majority vote among the k nearest stored samples (Euclidean).
//!
//! All prediction is deterministic: every tie has a fixed resolution rule.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pipeline::category::CategoryId;
use crate::pipeline::features::FeatureVector;
use crate::pipeline::{read_artifact, PipelineError};

// ────────────────────────────────────────────────────────────────────────────
// Artifact format
// ────────────────────────────────────────────────────────────────────────────

/// Serialized classifier artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    Linear {
        classes: Vec<CategoryId>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    KNeighbors {
        n_features: usize,
        k: usize,
        /// Sparse rows as `[column, value]` pairs.
        samples: Vec<Vec<(usize, f64)>>,
        labels: Vec<CategoryId>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A loaded, immutable decision model. Inputs are already dimension-checked.
pub trait DecisionModel: Send + Sync + std::fmt::Debug {
    fn n_features(&self) -> usize;
    fn class_count(&self) -> usize;
    fn backend(&self) -> &'static str;
    fn predict(&self, features: &FeatureVector) -> CategoryId;
}

#[derive(Debug)]
pub struct Classifier {
    model: Box<dyn DecisionModel>,
}

impl Classifier {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let model: ClassifierModel = read_artifact(path)?;
        Self::from_model(model).map_err(|e| match e {
            PipelineError::ModelLoad { reason, .. } => {
                PipelineError::model_load(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    pub fn from_model(model: ClassifierModel) -> Result<Self, PipelineError> {
        let model: Box<dyn DecisionModel> = match model {
            ClassifierModel::Linear {
                classes,
                coef,
                intercept,
            } => Box::new(LinearModel::new(classes, coef, intercept)?),
            ClassifierModel::KNeighbors {
                n_features,
                k,
                samples,
                labels,
            } => Box::new(NeighborsModel::new(n_features, k, samples, labels)?),
        };
        Ok(Self { model })
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    pub fn class_count(&self) -> usize {
        self.model.class_count()
    }

    pub fn backend(&self) -> &'static str {
        self.model.backend()
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<CategoryId, PipelineError> {
        if features.dimension() != self.model.n_features() {
            tracing::error!(
                expected = self.model.n_features(),
                actual = features.dimension(),
                "Feature vector does not match classifier input size"
            );
            return Err(PipelineError::DimensionMismatch {
                expected: self.model.n_features(),
                actual: features.dimension(),
            });
        }
        Ok(self.model.predict(features))
    }
}

fn invalid(reason: String) -> PipelineError {
    PipelineError::model_load("classifier", reason)
}

// ────────────────────────────────────────────────────────────────────────────
// LinearModel
// ────────────────────────────────────────────────────────────────────────────

/// One-vs-rest linear decision function.
///
/// With exactly two classes a single weight row is accepted: a positive score
/// selects the second class, anything else the first.
#[derive(Debug)]
pub struct LinearModel {
    classes: Vec<CategoryId>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LinearModel {
    pub fn new(
        classes: Vec<CategoryId>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, PipelineError> {
        if classes.len() < 2 {
            return Err(invalid(format!(
                "linear model needs at least 2 classes, got {}",
                classes.len()
            )));
        }
        let binary = classes.len() == 2 && coef.len() == 1;
        if !binary && coef.len() != classes.len() {
            return Err(invalid(format!(
                "{} weight rows for {} classes",
                coef.len(),
                classes.len()
            )));
        }
        if intercept.len() != coef.len() {
            return Err(invalid(format!(
                "{} intercepts for {} weight rows",
                intercept.len(),
                coef.len()
            )));
        }
        let n_features = coef[0].len();
        if n_features == 0 {
            return Err(invalid("weight rows are empty".to_string()));
        }
        if let Some(row) = coef.iter().position(|r| r.len() != n_features) {
            return Err(invalid(format!(
                "weight row {row} has {} columns, expected {n_features}",
                coef[row].len()
            )));
        }
        let all_finite = coef.iter().flatten().chain(intercept.iter()).all(|w| w.is_finite());
        if !all_finite {
            return Err(invalid("weights must be finite".to_string()));
        }
        Ok(Self {
            classes,
            coef,
            intercept,
            n_features,
        })
    }

    fn scores(&self, features: &FeatureVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| features.dot_dense(row) + b)
            .collect()
    }
}

impl DecisionModel for LinearModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn backend(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, features: &FeatureVector) -> CategoryId {
        let scores = self.scores(features);
        if scores.len() == 1 {
            return if scores[0] > 0.0 {
                self.classes[1]
            } else {
                self.classes[0]
            };
        }
        // First maximum wins ties
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        self.classes[best]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NeighborsModel
// ────────────────────────────────────────────────────────────────────────────

/// k-nearest-neighbours majority vote.
///
/// Equal distances are broken by sample order; equal vote counts by the smallest id.
#[derive(Debug)]
pub struct NeighborsModel {
    n_features: usize,
    k: usize,
    samples: Vec<FeatureVector>,
    labels: Vec<CategoryId>,
    class_count: usize,
}

impl NeighborsModel {
    pub fn new(
        n_features: usize,
        k: usize,
        samples: Vec<Vec<(usize, f64)>>,
        labels: Vec<CategoryId>,
    ) -> Result<Self, PipelineError> {
        if n_features == 0 {
            return Err(invalid("n_features must be positive".to_string()));
        }
        if k == 0 {
            return Err(invalid("k must be positive".to_string()));
        }
        if samples.is_empty() {
            return Err(invalid("no stored samples".to_string()));
        }
        if samples.len() != labels.len() {
            return Err(invalid(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        let samples = samples
            .into_iter()
            .enumerate()
            .map(|(i, pairs)| {
                FeatureVector::from_pairs(n_features, pairs)
                    .map_err(|e| invalid(format!("sample {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();

        Ok(Self {
            n_features,
            k,
            samples,
            labels,
            class_count: distinct.len(),
        })
    }
}

impl DecisionModel for NeighborsModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn class_count(&self) -> usize {
        self.class_count
    }

    fn backend(&self) -> &'static str {
        "k_neighbors"
    }

    fn predict(&self, features: &FeatureVector) -> CategoryId {
        let mut distances: Vec<(f64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, sample)| (features.squared_distance(sample), i))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<CategoryId, usize> = BTreeMap::new();
        for &(_, i) in distances.iter().take(self.k) {
            *votes.entry(self.labels[i]).or_insert(0) += 1;
        }

        // BTreeMap iterates ids ascending, so the first maximum is the smallest id
        votes
            .into_iter()
            .fold(None, |best: Option<(CategoryId, usize)>, (id, count)| match best {
                Some((_, best_count)) if count <= best_count => best,
                _ => Some((id, count)),
            })
            .map(|(id, _)| id)
            .unwrap_or(self.labels[0])
    }
}
