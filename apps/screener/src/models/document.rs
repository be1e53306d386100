use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// Declared format of an uploaded résumé. Drives extractor dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Text,
    Pdf,
}

impl DocumentFormat {
    /// Resolves a format from a filename's extension (`resume.PDF` → `Pdf`).
    pub fn from_filename(filename: &str) -> Result<Self, PipelineError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| PipelineError::UnsupportedFormat(filename.to_string()))?;
        extension.parse()
    }

    pub fn from_mime(mime: &str) -> Result<Self, PipelineError> {
        // Ignore parameters such as `; charset=utf-8`
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/plain" => Ok(Self::Text),
            "application/pdf" => Ok(Self::Pdf),
            _ => Err(PipelineError::UnsupportedFormat(mime.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = PipelineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            _ => Err(PipelineError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document: raw bytes plus the declared format.
/// Immutable once constructed; dropped after the pipeline run.
#[derive(Debug, Clone)]
pub struct Document {
    content: Bytes,
    format: DocumentFormat,
}

impl Document {
    pub fn new(content: impl Into<Bytes>, format: DocumentFormat) -> Self {
        Self {
            content: content.into(),
            format,
        }
    }

    /// Builds a document from an untrusted format tag.
    /// Rejects unknown tags before any bytes are looked at.
    pub fn with_tag(content: impl Into<Bytes>, tag: &str) -> Result<Self, PipelineError> {
        let format = tag.parse()?;
        Ok(Self::new(content, format))
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
