use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{Embedder, EmbedderError};
use crate::domain::Embedding;

use super::RetryPolicy;
use super::gemini_types::{
    API_KEY_HEADER, BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content,
    EmbedContentRequest, EmbedContentResponse, GEMINI_BASE_URL, TaskType, model_path,
};

pub const DEFAULT_EMBEDDING_MODEL: &str = "models/text-embedding-004";

/// Upper bound on `requests` per `batchEmbedContents` call.
pub const MAX_BATCH_SIZE: usize = 100;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Embeds text with the Gemini embedding API.
///
/// Chunks are embedded as `RETRIEVAL_DOCUMENT`, queries as `RETRIEVAL_QUERY`.
pub struct GeminiEmbedder {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    batch_size: usize,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiEmbedder {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model_path(&model.into()),
            base_url: GEMINI_BASE_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
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

    fn api_key(&self) -> Result<&str, EmbedderError> {
        self.api_key.as_deref().ok_or(EmbedderError::MissingApiKey)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R, EmbedderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:{}", self.base_url, self.model, method);
        let url = url.as_str();

        self.retry
            .run(
                move || async move {
                    let response = self
                        .client
                        .post(url)
                        .header(API_KEY_HEADER, api_key)
                        .timeout(self.timeout)
                        .json(body)
                        .send()
                        .await
                        .map_err(|e| EmbedderError::ApiRequestFailed(e.to_string()))?;

                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(EmbedderError::RateLimited);
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        let body = response.text().await.unwrap_or_default();
                        return Err(EmbedderError::Unauthorized(format!("HTTP {status}: {body}")));
                    }

                    if status.is_client_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(EmbedderError::Rejected(format!("HTTP {status}: {body}")));
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(EmbedderError::ApiRequestFailed(format!(
                            "HTTP {status}: {body}"
                        )));
                    }

                    response
                        .json::<R>()
                        .await
                        .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))
                },
                EmbedderError::is_transient,
            )
            .await
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    #[tracing::instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        let request = EmbedContentRequest {
            model: &self.model,
            content: Content::text(text),
            task_type: TaskType::RetrievalQuery,
        };

        let response: EmbedContentResponse = self.post("embedContent", &request).await?;

        if response.embedding.values.is_empty() {
            return Err(EmbedderError::InvalidResponse("empty embedding".to_string()));
        }

        Ok(Embedding::new(response.embedding.values))
    }

    #[tracing::instrument(skip(self, texts), fields(model = %self.model, texts = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = BatchEmbedContentsRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedContentRequest {
                        model: &self.model,
                        content: Content::text(text),
                        task_type: TaskType::RetrievalDocument,
                    })
                    .collect(),
            };

            let response: BatchEmbedContentsResponse =
                self.post("batchEmbedContents", &request).await?;

            if response.embeddings.len() != batch.len() {
                return Err(EmbedderError::CountMismatch {
                    expected: batch.len(),
                    actual: response.embeddings.len(),
                });
            }

            embeddings.extend(
                response
                    .embeddings
                    .into_iter()
                    .map(|e| Embedding::new(e.values)),
            );
        }

        tracing::debug!(vectors = embeddings.len(), "Batch embedded");
        Ok(embeddings)
    }
}
