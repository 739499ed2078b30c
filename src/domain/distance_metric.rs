use serde::Deserialize;

use super::Embedding;

/// Similarity measure used by a vector index. Scores are always
/// "higher is closer" regardless of the metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    Cosine,
    #[default]
    Euclidean,
    DotProduct,
}

impl DistanceMetric {
    pub fn score(&self, a: &Embedding, b: &Embedding) -> f32 {
        match self {
            Self::Cosine => a.cosine_similarity(b),
            Self::DotProduct => a.dot(b),
            Self::Euclidean => 1.0 / (1.0 + a.euclidean_distance(b)),
        }
    }
}
