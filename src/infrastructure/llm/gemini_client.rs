use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::application::ports::{GenerationParams, LlmClient, LlmClientError};

use super::RetryPolicy;
use super::gemini_types::{
    API_KEY_HEADER, Content, GEMINI_BASE_URL, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, model_path,
};

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash-preview-05-20";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Single-turn text generation against `models/{model}:generateContent`.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model_path(&model.into()),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_once(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<String, LlmClientError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::Unauthorized(format!("HTTP {status}: {body}")));
        }

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::Rejected(format!("HTTP {status}: {body}")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let generation: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        if let Some(reason) = generation
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmClientError::InvalidResponse(format!(
                "prompt blocked: {reason}"
            )));
        }

        let candidate = generation
            .candidates
            .first()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty candidates".to_string()))?;

        let text = candidate.text();
        if text.is_empty() {
            return Err(LlmClientError::InvalidResponse(format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[tracing::instrument(
        skip(self, prompt),
        fields(
            model = %self.model,
            temperature = params.temperature,
            max_output_tokens = params.max_output_tokens,
        )
    )]
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmClientError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let answer = self
            .retry
            .run(
                || self.generate_once(&url, api_key, &request),
                LlmClientError::is_transient,
            )
            .await?;

        tracing::debug!(answer_chars = answer.chars().count(), "Generation complete");
        Ok(answer)
    }
}
