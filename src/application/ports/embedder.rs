use async_trait::async_trait;

use crate::domain::Embedding;

/// Maps text to vectors. `embed_batch` is used for document chunks and
/// `embed` for queries, so implementations may tune each side differently.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding api key is not configured")]
    MissingApiKey,
    #[error("embedding api rejected credentials: {0}")]
    Unauthorized(String),
    #[error("embedding api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("embedding api rejected request: {0}")]
    Rejected(String),
    #[error("embedding rate limited")]
    RateLimited,
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },
}

impl EmbedderError {
    /// Rate limits, transport failures and 5xx responses.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ApiRequestFailed(_))
    }
}
