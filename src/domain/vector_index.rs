use super::{Chunk, DistanceMetric, Embedding, SearchResult};

/// An immutable, in-memory nearest-neighbour index over one document's chunks.
///
/// Built once per request and owned by it; there is no insert or delete.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Embedding)>,
    dimensions: usize,
    metric: DistanceMetric,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VectorIndexError {
    #[error("chunk/vector count mismatch: {chunks} chunks, {vectors} vectors")]
    LengthMismatch { chunks: usize, vectors: usize },
    #[error("vector {position} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },
    #[error("query has {actual} dimensions, index has {expected}")]
    QueryDimensionMismatch { expected: usize, actual: usize },
}

impl VectorIndex {
    pub fn build(
        chunks: Vec<Chunk>,
        embeddings: Vec<Embedding>,
        metric: DistanceMetric,
    ) -> Result<Self, VectorIndexError> {
        if chunks.len() != embeddings.len() {
            return Err(VectorIndexError::LengthMismatch {
                chunks: chunks.len(),
                vectors: embeddings.len(),
            });
        }

        let dimensions = embeddings.first().map_or(0, Embedding::dimensions);
        if let Some((position, bad)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.dimensions() != dimensions)
        {
            return Err(VectorIndexError::DimensionMismatch {
                position,
                expected: dimensions,
                actual: bad.dimensions(),
            });
        }

        Ok(Self {
            entries: chunks.into_iter().zip(embeddings).collect(),
            dimensions,
            metric,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the `min(k, len)` closest chunks, best first. Equal scores keep
    /// build order. NaN scores rank last.
    pub fn search(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.dimensions() != self.dimensions {
            return Err(VectorIndexError::QueryDimensionMismatch {
                expected: self.dimensions,
                actual: query.dimensions(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, embedding))| {
                let score = self.metric.score(embedding, query);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult {
                chunk: self.entries[i].0.clone(),
                score,
            })
            .collect())
    }
}
