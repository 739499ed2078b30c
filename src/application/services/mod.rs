mod answer_generator;
mod qa_service;
mod retriever;

pub use answer_generator::AnswerGenerator;
pub use qa_service::{QaError, QaService, QaSettings, Stage};
pub use retriever::{DEFAULT_TOP_K, RetrievalError, Retriever};
