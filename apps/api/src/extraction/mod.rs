//! Text extraction: turns uploaded document bytes into plain text.
//!
//! `pdf-extract` is CPU-bound and can panic on malformed input, so extraction
//! runs on the blocking pool and a panicked task is reported as unreadable.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("The uploaded file is empty.")]
    Empty,

    #[error("The uploaded file is not a PDF document.")]
    NotPdf,

    #[error("Failed to read text from PDF: {0}. Please ensure it's a valid and readable PDF file.")]
    Parse(String),

    #[error(
        "Could not extract text from the uploaded PDF. It might be empty, image-based, or corrupted."
    )]
    NoText,
}

/// Anything that can pull plain text out of a document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: Bytes) -> Result<String, ExtractionError>;
}

/// Default extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: Bytes) -> Result<String, ExtractionError> {
        if document.is_empty() {
            return Err(ExtractionError::Empty);
        }
        if !is_pdf(&document) {
            return Err(ExtractionError::NotPdf);
        }

        let size = document.len();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document))
            .await
            .map_err(|e| {
                warn!("PDF extraction task failed: {e}");
                ExtractionError::Parse("the PDF could not be parsed".to_string())
            })?
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        debug!("Extracted {} characters from {} byte PDF", text.len(), size);
        ensure_text(text)
    }
}

/// Returns true if the buffer starts with the PDF magic bytes.
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(PDF_MAGIC)
}

/// Rejects extraction output that is empty after trimming.
fn ensure_text(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::NoText)
    } else {
        Ok(text)
    }
}
