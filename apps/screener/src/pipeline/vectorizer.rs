//! TF-IDF vectorizer over a fixed, pre-built vocabulary.
//!
//! The artifact is produced at training time and never changes while serving:
//! unseen terms are ignored and the output dimension always equals `idf.len()`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::features::FeatureVector;
use crate::pipeline::{read_artifact, PipelineError};

/// Two or more word characters, bounded.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Serialized vectorizer artifact. Unknown keys are rejected, so an export
/// with options this vectorizer does not implement fails to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TfidfModel {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_lowercase() -> bool {
    true
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let model: TfidfModel = read_artifact(path)?;
        Self::from_model(model).map_err(|e| match e {
            PipelineError::ModelLoad { reason, .. } => {
                PipelineError::model_load(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Validates the artifact; any inconsistency is a load failure.
    pub fn from_model(model: TfidfModel) -> Result<Self, PipelineError> {
        let invalid = |reason: String| PipelineError::model_load("vectorizer", reason);

        if model.idf.is_empty() {
            return Err(invalid("idf vector is empty".to_string()));
        }
        if model.vocabulary.len() != model.idf.len() {
            return Err(invalid(format!(
                "vocabulary has {} terms but idf has {} columns",
                model.vocabulary.len(),
                model.idf.len()
            )));
        }
        let mut seen = vec![false; model.idf.len()];
        for (term, &column) in &model.vocabulary {
            match seen.get_mut(column) {
                None => {
                    return Err(invalid(format!(
                        "term {term:?} maps to column {column}, beyond {}",
                        model.idf.len()
                    )))
                }
                Some(true) => {
                    return Err(invalid(format!("column {column} assigned to more than one term")))
                }
                Some(slot) => *slot = true,
            }
        }
        if let Some(column) = model.idf.iter().position(|w| !w.is_finite()) {
            return Err(invalid(format!("idf weight at column {column} is not finite")));
        }
        let (min_n, max_n) = model.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(invalid(format!("invalid ngram range ({min_n}, {max_n})")));
        }

        let stop_words = model
            .stop_words
            .into_iter()
            .map(|w| if model.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            vocabulary: model.vocabulary,
            idf: model.idf,
            lowercase: model.lowercase,
            sublinear_tf: model.sublinear_tf,
            norm: model.norm,
            ngram_range: model.ngram_range,
            stop_words,
        })
    }

    /// Output dimension: the vocabulary size baked into the artifact.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vectorize(&self, text: &str) -> Result<FeatureVector, PipelineError> {
        let mut batch = self.vectorize_batch(&[text])?;
        Ok(batch.swap_remove(0))
    }

    /// One vector per input, in order.
    pub fn vectorize_batch<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<Vec<FeatureVector>, PipelineError> {
        documents
            .iter()
            .map(|doc| self.weigh(doc.as_ref()))
            .collect()
    }

    fn weigh(&self, text: &str) -> Result<FeatureVector, PipelineError> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }
        if counts.is_empty() {
            return Ok(FeatureVector::zeros(self.dimension()));
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
                (column, tf * self.idf[column])
            })
            .collect();

        let magnitude = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        // An overflowing norm would otherwise scale every weight to zero
        if !magnitude.is_finite() {
            tracing::error!(norm = ?self.norm, "TF-IDF norm overflowed");
            return Err(PipelineError::model_load(
                "vectorizer",
                "idf weights overflow the feature norm",
            ));
        }
        if magnitude > 0.0 {
            for (_, value) in &mut entries {
                *value /= magnitude;
            }
        }

        FeatureVector::from_pairs(self.dimension(), entries).map_err(|e| {
            tracing::error!(error = %e, "TF-IDF weights are not usable");
            PipelineError::model_load("vectorizer", e)
        })
    }

    /// Tokenizes, drops stop words, and expands n-grams.
    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}
