use std::fmt;
use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, FileLoader, FileLoaderError, LlmClient, LlmClientError,
    TextSplitter, TextSplitterError,
};
use crate::domain::{DistanceMetric, Document, VectorIndex, VectorIndexError};

use super::{AnswerGenerator, DEFAULT_TOP_K, RetrievalError, Retriever};

#[derive(Debug, Clone, Copy)]
pub struct QaSettings {
    pub top_k: usize,
    pub distance_metric: DistanceMetric,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            distance_metric: DistanceMetric::default(),
        }
    }
}

/// Answers one question about one uploaded document.
///
/// Every call runs the full pipeline (load, split, embed, index, retrieve,
/// generate). Nothing is cached between calls: asking twice about the same file
/// embeds it twice. The index built for a call never leaves that call.
pub struct QaService<F, L: ?Sized, T: ?Sized>
where
    F: FileLoader,
    L: LlmClient,
    T: TextSplitter,
{
    file_loader: Arc<F>,
    text_splitter: Arc<T>,
    embedder: Arc<dyn Embedder>,
    generator: AnswerGenerator<L>,
    settings: QaSettings,
}

impl<F, L: ?Sized, T: ?Sized> QaService<F, L, T>
where
    F: FileLoader,
    L: LlmClient,
    T: TextSplitter,
{
    pub fn new(
        file_loader: Arc<F>,
        text_splitter: Arc<T>,
        embedder: Arc<dyn Embedder>,
        generator: AnswerGenerator<L>,
        settings: QaSettings,
    ) -> Self {
        Self {
            file_loader,
            text_splitter,
            embedder,
            generator,
            settings,
        }
    }

    #[tracing::instrument(
        skip(self, document, question),
        fields(
            document_id = %document.id.as_uuid(),
            filename = %document.filename,
        )
    )]
    pub async fn handle(&self, document: &Document, question: &str) -> Result<String, QaError> {
        let pages = self.file_loader.load(document).await?;
        tracing::debug!(pages = pages.len(), "Document loaded");

        let chunks = self.text_splitter.split_pages(&pages, document.id).await?;
        if chunks.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()).into());
        }
        tracing::debug!(chunks = chunks.len(), "Document split");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(QaError::Embedding)?;

        if embeddings.len() != chunks.len() {
            return Err(QaError::Embedding(EmbedderError::CountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            }));
        }

        let index = VectorIndex::build(chunks, embeddings, self.settings.distance_metric)?;
        tracing::debug!(
            vectors = index.len(),
            dimensions = index.dimensions(),
            "Index built"
        );

        let retriever = Retriever::new(Arc::clone(&self.embedder), index, self.settings.top_k);
        let retrieved = retriever.retrieve(question).await?;

        let answer = self
            .generator
            .answer(question, &retrieved)
            .await
            .map_err(QaError::Generation)?;

        tracing::info!(
            context_chunks = retrieved.len(),
            answer_chars = answer.chars().count(),
            "Question answered"
        );

        Ok(answer)
    }
}

/// Pipeline step at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Split,
    Embed,
    Index,
    Generate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Split => "split",
            Self::Embed => "embed",
            Self::Index => "index",
            Self::Generate => "generate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("file loading: {0}")]
    Load(#[from] FileLoaderError),
    #[error("text splitting: {0}")]
    Split(#[from] TextSplitterError),
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("index: {0}")]
    Index(#[from] VectorIndexError),
    #[error("generation: {0}")]
    Generation(LlmClientError),
}

impl QaError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Load(_) => Stage::Load,
            Self::Split(_) => Stage::Split,
            Self::Embedding(_) => Stage::Embed,
            Self::Index(_) => Stage::Index,
            Self::Generation(_) => Stage::Generate,
        }
    }
}

impl From<RetrievalError> for QaError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Embedding(e) => Self::Embedding(e),
            RetrievalError::Search(e) => Self::Index(e),
        }
    }
}
