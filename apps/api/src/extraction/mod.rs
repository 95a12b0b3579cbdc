//! Text extraction from uploaded PDF documents.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error,
//! so every call goes through `catch_unwind`. Extraction is CPU-bound; async
//! callers should use [`extract_text_blocking`].

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error extracting PDF: {0}")]
    Parse(String),

    #[error("Error extracting PDF: extraction task failed: {0}")]
    Task(String),
}

/// Extracts the text of every page in natural order and concatenates the
/// non-empty results without adding separators.
///
/// An empty string is a valid result. On failure nothing partial is returned.
pub fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    let pages = extract_pages(data)?;
    let page_count = pages.len();
    let text = join_pages(pages);

    debug!("Extracted {} chars from {page_count} PDF pages", text.len());
    Ok(text)
}

/// Runs [`extract_text`] on the blocking thread pool.
pub async fn extract_text_blocking(data: Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text(&data))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

fn join_pages(pages: Vec<String>) -> String {
    pages.into_iter().filter(|page| !page.is_empty()).collect()
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Parse(e.to_string())),
        Err(_) => Err(ExtractionError::Parse(
            "PDF parser panicked (malformed document)".to_string(),
        )),
    }
}
