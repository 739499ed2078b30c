use async_trait::async_trait;

use crate::domain::{Document, PageRecord};

#[async_trait]
pub trait FileLoader: Send + Sync {
    /// Returns the document's non-blank pages in page order.
    async fn load(&self, document: &Document) -> Result<Vec<PageRecord>, FileLoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileLoaderError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("no text found in {0}")]
    NoTextFound(String),
}
