use async_trait::async_trait;

use crate::domain::{Chunk, DocumentId, PageRecord};

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(
        &self,
        text: &str,
        document_id: DocumentId,
        page: u32,
    ) -> Result<Vec<Chunk>, TextSplitterError>;

    /// Splits every page on its own; no chunk ever spans two pages.
    async fn split_pages(
        &self,
        pages: &[PageRecord],
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, TextSplitterError> {
        let mut chunks = Vec::new();
        for page in pages {
            chunks.extend(self.split(&page.text, document_id, page.page).await?);
        }
        Ok(chunks)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid splitter configuration: {0}")]
    InvalidConfiguration(String),
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
