mod gemini_client;
mod gemini_embedder;
mod gemini_types;
mod retry;

pub use gemini_client::{DEFAULT_CHAT_MODEL, GeminiClient};
pub use gemini_embedder::{DEFAULT_EMBEDDING_MODEL, GeminiEmbedder, MAX_BATCH_SIZE};
pub use gemini_types::{GEMINI_BASE_URL, model_path};
pub use retry::RetryPolicy;
