#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use qbot::application::ports::{
    Embedder, EmbedderError, FileLoader, FileLoaderError, GenerationParams, LlmClient,
    LlmClientError,
};
use qbot::domain::{Document, Embedding, PageRecord};

pub const TEST_DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word hashes into one of
/// `TEST_DIMENSIONS` buckets and the vector is normalized to unit length.
/// Texts sharing words land close together under every metric.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub embed_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vector_for(text: &str) -> Embedding {
        let mut values = vec![0.0f32; TEST_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !is_stop_word(w))
        {
            values[bucket(&word.to_lowercase())] += 1.0;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        Embedding::new(values)
    }

    pub fn total_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
    }
}

fn is_stop_word(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "the" | "is" | "a" | "an" | "what" | "of" | "on" | "to"
    )
}

fn bucket(word: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % TEST_DIMENSIONS as u64) as usize
}

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

#[derive(Default)]
pub struct FailingEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbedderError::ApiRequestFailed("service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbedderError::ApiRequestFailed("service unavailable".to_string()))
    }
}

/// Returns one vector fewer than requested.
pub struct ShortBatchEmbedder;

#[async_trait::async_trait]
impl Embedder for ShortBatchEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(KeywordEmbedder::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts
            .iter()
            .skip(1)
            .map(|t| KeywordEmbedder::vector_for(t))
            .collect())
    }
}

/// Embeds documents at `TEST_DIMENSIONS` but queries at a different size.
pub struct SkewedQueryEmbedder;

#[async_trait::async_trait]
impl Embedder for SkewedQueryEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        Ok(Embedding::new(vec![1.0; TEST_DIMENSIONS + 1]))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts
            .iter()
            .map(|t| KeywordEmbedder::vector_for(t))
            .collect())
    }
}

/// Answers with the prompt it was given.
#[derive(Default)]
pub struct EchoLlmClient {
    pub prompts: Mutex<Vec<String>>,
    pub params: Mutex<Vec<GenerationParams>>,
}

impl EchoLlmClient {
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

#[async_trait::async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.params.lock().unwrap().push(*params);
        Ok(prompt.to_string())
    }
}

pub struct FailingLlmClient;

#[async_trait::async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, LlmClientError> {
        Err(LlmClientError::RateLimited)
    }
}

/// Serves fixed page texts regardless of the document.
pub struct StubFileLoader {
    pages: Vec<PageRecord>,
}

impl StubFileLoader {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| PageRecord::new(i as u32 + 1, (*text).to_string()))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl FileLoader for StubFileLoader {
    async fn load(&self, document: &Document) -> Result<Vec<PageRecord>, FileLoaderError> {
        if self.pages.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()));
        }
        Ok(self.pages.clone())
    }
}

pub fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
