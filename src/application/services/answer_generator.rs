use std::sync::Arc;

use crate::application::ports::{GenerationParams, LlmClient, LlmClientError};
use crate::domain::SearchResult;

const PROMPT_PREAMBLE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

const CONTEXT_SEPARATOR: &str = "\n\n";

pub struct AnswerGenerator<L: ?Sized>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    params: GenerationParams,
}

impl<L: ?Sized> AnswerGenerator<L>
where
    L: LlmClient,
{
    pub fn new(llm_client: Arc<L>, params: GenerationParams) -> Self {
        Self { llm_client, params }
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn build_prompt(question: &str, retrieved: &[SearchResult]) -> String {
        let context = retrieved
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        format!("{PROMPT_PREAMBLE}\n\n{context}\n\nQuestion: {question}\nHelpful Answer:")
    }

    #[tracing::instrument(skip_all, fields(context_chunks = retrieved.len()))]
    pub async fn answer(
        &self,
        question: &str,
        retrieved: &[SearchResult],
    ) -> Result<String, LlmClientError> {
        let prompt = Self::build_prompt(question, retrieved);
        tracing::debug!(prompt_chars = prompt.chars().count(), "Sending prompt");

        self.llm_client.complete(&prompt, &self.params).await
    }
}
