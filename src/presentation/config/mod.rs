mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, EmbeddingsSettings, GeminiSettings, LlmSettings, LoggingSettings,
    RetrievalSettings, RetrySettings, ServerSettings, Settings,
};
