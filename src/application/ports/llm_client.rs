use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_output_tokens: 256,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("llm api key is not configured")]
    MissingApiKey,
    #[error("llm api rejected credentials: {0}")]
    Unauthorized(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("llm api rejected request: {0}")]
    Rejected(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmClientError {
    /// Rate limits, transport failures and 5xx responses.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ApiRequestFailed(_))
    }
}
