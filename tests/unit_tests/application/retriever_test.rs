use std::sync::Arc;

use qbot::application::ports::Embedder;
use qbot::application::services::{DEFAULT_TOP_K, RetrievalError, Retriever};
use qbot::domain::{Chunk, DistanceMetric, DocumentId, VectorIndex, VectorIndexError};

use crate::helpers::{FailingEmbedder, KeywordEmbedder, SkewedQueryEmbedder};

const FACTS: [&str; 5] = [
    "The sky is blue.",
    "Water is wet.",
    "Grass is green.",
    "Fire is hot.",
    "Rust uses tokio.",
];

fn index_of(texts: &[&str], metric: DistanceMetric) -> VectorIndex {
    let document_id = DocumentId::new();
    let chunks: Vec<Chunk> = texts
        .iter()
        .map(|t| Chunk::new((*t).to_string(), document_id, 1, 0))
        .collect();
    let embeddings = texts
        .iter()
        .map(|t| KeywordEmbedder::vector_for(t))
        .collect();
    VectorIndex::build(chunks, embeddings, metric).unwrap()
}

#[tokio::test]
async fn given_question_about_sky_when_retrieving_then_sky_chunk_ranks_first() {
    let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder::default());
    let retriever = Retriever::new(
        embedder,
        index_of(&FACTS, DistanceMetric::Euclidean),
        DEFAULT_TOP_K,
    );

    let results = retriever.retrieve("What color is the sky?").await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(results[0].chunk.text.contains("sky is blue"));
}

#[tokio::test]
async fn given_each_metric_when_retrieving_then_same_best_match() {
    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::DotProduct,
        DistanceMetric::Euclidean,
    ] {
        let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder::default());
        let retriever = Retriever::new(embedder, index_of(&FACTS, metric), 2);

        let results = retriever.retrieve("Is fire hot?").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "Fire is hot.", "metric {metric:?}");
    }
}

#[tokio::test]
async fn given_fewer_chunks_than_k_when_retrieving_then_returns_all() {
    let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder::default());
    let retriever = Retriever::new(
        embedder,
        index_of(&FACTS[..2], DistanceMetric::Euclidean),
        DEFAULT_TOP_K,
    );

    let results = retriever.retrieve("anything").await.unwrap();

    assert_eq!(retriever.index().len(), 2);
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn given_failing_embedder_when_retrieving_then_embedding_error() {
    let embedder: Arc<dyn Embedder> = Arc::new(FailingEmbedder::default());
    let retriever = Retriever::new(embedder, index_of(&FACTS, DistanceMetric::Euclidean), 4);

    let result = retriever.retrieve("What color is the sky?").await;

    assert!(matches!(result, Err(RetrievalError::Embedding(_))));
}

#[tokio::test]
async fn given_query_vector_of_other_size_when_retrieving_then_search_error() {
    let embedder: Arc<dyn Embedder> = Arc::new(SkewedQueryEmbedder);
    let retriever = Retriever::new(embedder, index_of(&FACTS, DistanceMetric::Euclidean), 4);

    let result = retriever.retrieve("sky").await;

    assert!(matches!(
        result,
        Err(RetrievalError::Search(
            VectorIndexError::QueryDimensionMismatch { .. }
        ))
    ));
}
