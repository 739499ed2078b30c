mod chunk;
mod distance_metric;
mod document;
mod embedding;
mod page_record;
mod search_result;
mod vector_index;

pub use chunk::{Chunk, ChunkId, DocumentId};
pub use distance_metric::DistanceMetric;
pub use document::Document;
pub use embedding::Embedding;
pub use page_record::PageRecord;
pub use search_result::SearchResult;
pub use vector_index::{VectorIndex, VectorIndexError};
