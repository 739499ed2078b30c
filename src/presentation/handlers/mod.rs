mod answer;
mod index;

pub use answer::{AnswerResponse, ErrorResponse, answer_handler};
pub use index::index_handler;
