use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use thiserror::Error;

use crate::errors::describe_pipeline_error;
use crate::models::document::{Document, DocumentFormat};
use crate::pipeline::{ClassificationOutcome, Pipeline, PipelineError};

/// Classifies résumés into job categories with a pre-trained TF-IDF model.
#[derive(Parser, Debug)]
#[command(name = "screener", version, about)]
pub struct Cli {
    /// Defaults to `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve,
    /// Classify local files and print one JSON object per file
    Classify {
        /// `.txt` or `.pdf` résumés
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Treat every file as this format (`text`, `txt` or `pdf`) instead of
        /// going by its extension
        #[arg(long)]
        format: Option<String>,
    },
}

/// Classifies each file in order and writes JSON lines to `out`.
/// Bad documents get an inline error line; a fatal pipeline error stops the run.
pub fn classify_files(
    pipeline: &Pipeline,
    files: &[PathBuf],
    format: Option<&str>,
    mut out: impl Write,
) -> Result<()> {
    for path in files {
        let filename = path.display().to_string();
        let line = match classify_file(pipeline, path, format) {
            Ok(outcome) => json!({ "filename": filename, "outcome": outcome }),
            Err(FileFailure::Pipeline(e)) if !e.is_fatal() => {
                tracing::warn!(filename = %filename, error = %e, "Document rejected");
                let (_, code, message) = describe_pipeline_error(&e);
                json!({ "filename": filename, "error": { "code": code, "message": message } })
            }
            Err(FileFailure::Pipeline(e)) => return Err(e.into()),
            Err(FileFailure::Io(e)) => {
                return Err(e).with_context(|| format!("Failed to read '{filename}'"))
            }
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[derive(Debug, Error)]
enum FileFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn classify_file(
    pipeline: &Pipeline,
    path: &Path,
    format: Option<&str>,
) -> Result<ClassificationOutcome, FileFailure> {
    let document = match format {
        Some(tag) => Document::with_tag(std::fs::read(path)?, tag)?,
        None => {
            let format = DocumentFormat::from_filename(&path.to_string_lossy())?;
            Document::new(std::fs::read(path)?, format)
        }
    };
    Ok(pipeline.run(&document)?)
}
