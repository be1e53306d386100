//! Text extraction, dispatched on the document's declared format.

use std::panic;

use tracing::{debug, warn};

use crate::models::document::{Document, DocumentFormat};
use crate::pipeline::PipelineError;

const PAGE_PREFIX: &str = "\n\n";

pub fn extract(document: &Document) -> Result<String, PipelineError> {
    match document.format() {
        DocumentFormat::Text => Ok(decode_text(document.content())),
        DocumentFormat::Pdf => extract_pdf(document.content()),
    }
}

/// UTF-8 first; Latin-1 only when the bytes are not valid UTF-8.
/// Latin-1 maps every byte to the code point of the same value, so this cannot fail.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!(valid_up_to = e.valid_up_to(), "Not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Concatenates the text of every page in source order, with no separator.
/// Pages without a text layer contribute an empty string.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, PipelineError> {
    // pdf-extract can panic on hostile input instead of returning an error
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| {
            warn!("PDF parser panicked");
            PipelineError::MalformedDocument("PDF could not be parsed".to_string())
        })?
        .map_err(|e| PipelineError::MalformedDocument(format!("failed to parse PDF: {e}")))?;

    debug!(page_count = pages.len(), "PDF text extraction complete");
    // pdf-extract opens every page with a blank line of its own
    Ok(pages
        .iter()
        .map(|page| page.strip_prefix(PAGE_PREFIX).unwrap_or(page))
        .collect())
}
