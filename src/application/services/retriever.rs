use std::sync::Arc;

use crate::application::ports::{Embedder, EmbedderError};
use crate::domain::{SearchResult, VectorIndex, VectorIndexError};

pub const DEFAULT_TOP_K: usize = 4;

/// Query-time search over one request's index.
///
/// The retriever takes the index by value so each request's chunks stay in
/// that request's scope.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: VectorIndex,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: VectorIndex, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[tracing::instrument(skip(self, query), fields(top_k = self.top_k, indexed = self.index.len()))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, RetrievalError> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        let results = self
            .index
            .search(&query_embedding, self.top_k)
            .map_err(RetrievalError::Search)?;

        tracing::debug!(
            results = results.len(),
            best_score = results.first().map(|r| r.score),
            "Retrieved chunks"
        );

        Ok(results)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorIndexError),
}
