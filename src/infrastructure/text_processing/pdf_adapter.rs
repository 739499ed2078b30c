use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, PageRecord};

use super::text_sanitizer::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads a PDF from disk, one [`PageRecord`] per page that carries text.
pub struct PdfAdapter {
    timeout: Duration,
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self {
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract_pages(path: &Path) -> Result<Vec<PageRecord>, FileLoaderError> {
        let mut doc = PdfDocument::open(path)
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let page_count = doc.page_count().map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("failed to read page count: {e}"))
        })?;

        let mut pages = Vec::with_capacity(page_count);

        for page_index in 0..page_count {
            let raw = match doc.extract_text(page_index) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(page = page_index + 1, error = %e, "Skipping unreadable page");
                    continue;
                }
            };

            let text = sanitize_extracted_text(&raw);
            if !text.is_empty() {
                pages.push(PageRecord::new((page_index + 1) as u32, text));
            }
        }

        Ok(pages)
    }
}

#[async_trait]
impl FileLoader for PdfAdapter {
    #[tracing::instrument(
        skip(self, document),
        fields(
            document_id = %document.id.as_uuid(),
            filename = %document.filename,
        )
    )]
    async fn load(&self, document: &Document) -> Result<Vec<PageRecord>, FileLoaderError> {
        let path = document.path().to_path_buf();

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| FileLoaderError::NotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(FileLoaderError::NotFound(path.display().to_string()));
        }
        if metadata.len() == 0 {
            return Err(FileLoaderError::ExtractionFailed(format!(
                "{} is empty",
                document.filename
            )));
        }

        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_pages(&path)),
        )
        .await
        .map_err(|_| FileLoaderError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("task join error: {e}")))??;

        tracing::info!(page_count = pages.len(), "PDF text extraction complete");

        if pages.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()));
        }

        Ok(pages)
    }
}
