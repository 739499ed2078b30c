use std::sync::Arc;
use std::sync::atomic::Ordering;

use qbot::application::ports::{
    Embedder, EmbedderError, FileLoader, FileLoaderError, GenerationParams, LlmClient,
    LlmClientError,
};
use qbot::application::services::{AnswerGenerator, QaError, QaService, QaSettings, Stage};
use qbot::domain::Document;
use qbot::infrastructure::text_processing::{PdfAdapter, RecursiveCharacterSplitter};

use crate::helpers::{
    EchoLlmClient, FailingEmbedder, FailingLlmClient, KeywordEmbedder, ShortBatchEmbedder,
    StubFileLoader,
};

fn service<F, L>(
    loader: F,
    embedder: Arc<dyn Embedder>,
    llm: Arc<L>,
) -> QaService<F, L, RecursiveCharacterSplitter>
where
    F: FileLoader,
    L: LlmClient,
{
    QaService::new(
        Arc::new(loader),
        Arc::new(RecursiveCharacterSplitter::default()),
        embedder,
        AnswerGenerator::new(llm, GenerationParams::default()),
        QaSettings::default(),
    )
}

fn document() -> Document {
    Document::new("facts.pdf", "/unused/facts.pdf")
}

#[tokio::test]
async fn given_page_about_sky_when_asking_color_then_answer_mentions_blue() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(
        StubFileLoader::with_pages(&["The sky is blue. Water is wet."]),
        embedder.clone(),
        Arc::clone(&llm),
    );

    let answer = qa
        .handle(&document(), "What color is the sky?")
        .await
        .unwrap();

    assert!(answer.contains("blue"));
    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("The sky is blue. Water is wet."));
    assert!(prompt.contains("Question: What color is the sky?"));
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(embedder.embed_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_same_document_twice_when_asking_then_pipeline_reruns() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(
        StubFileLoader::with_pages(&["The sky is blue."]),
        embedder.clone(),
        Arc::clone(&llm),
    );
    let doc = document();

    qa.handle(&doc, "sky?").await.unwrap();
    qa.handle(&doc, "sky?").await.unwrap();

    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 2);
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn given_long_document_when_asking_then_at_most_four_chunks_in_context() {
    let page = (0..30)
        .map(|i| format!("Sentence {i} says the sky is blue on day {i}."))
        .collect::<Vec<_>>()
        .join(" ");
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(
        StubFileLoader::with_pages(&[page.as_str()]),
        Arc::new(KeywordEmbedder::default()),
        Arc::clone(&llm),
    );

    qa.handle(&document(), "What color is the sky?")
        .await
        .unwrap();

    let prompt = llm.last_prompt().unwrap();
    let context = prompt
        .split_once("\n\n")
        .and_then(|(_, rest)| rest.rsplit_once("\n\nQuestion:"))
        .map(|(context, _)| context)
        .unwrap();
    assert_eq!(context.split("\n\n").count(), 4);
}

#[tokio::test]
async fn given_missing_file_when_handling_then_load_error_and_embedder_untouched() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(PdfAdapter::new(), embedder.clone(), Arc::clone(&llm));

    let result = qa
        .handle(
            &Document::from_path("/definitely/not/here.pdf"),
            "What color is the sky?",
        )
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(matches!(err, QaError::Load(FileLoaderError::NotFound(_))));
    assert_eq!(embedder.total_calls(), 0);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_empty_file_when_handling_then_load_error_and_embedder_untouched() {
    let empty = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    let embedder = Arc::new(KeywordEmbedder::default());
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(PdfAdapter::new(), embedder.clone(), Arc::clone(&llm));

    let result = qa
        .handle(&Document::from_path(empty.path()), "anything?")
        .await;

    assert!(matches!(result, Err(QaError::Load(_))));
    assert_eq!(embedder.total_calls(), 0);
}

#[tokio::test]
async fn given_whitespace_only_pages_when_handling_then_no_text_found() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let qa = service(
        StubFileLoader::with_pages(&["   \n\n  "]),
        embedder.clone(),
        Arc::new(EchoLlmClient::default()),
    );

    let result = qa.handle(&document(), "anything?").await;

    assert!(matches!(
        result,
        Err(QaError::Load(FileLoaderError::NoTextFound(_)))
    ));
    assert_eq!(embedder.total_calls(), 0);
}

#[tokio::test]
async fn given_failing_embedder_when_handling_then_embed_stage_and_llm_untouched() {
    let embedder = Arc::new(FailingEmbedder::default());
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(
        StubFileLoader::with_pages(&["The sky is blue. Water is wet."]),
        embedder.clone(),
        Arc::clone(&llm),
    );

    let result = qa.handle(&document(), "What color is the sky?").await;

    let err = result.unwrap_err();
    assert_eq!(err.stage(), Stage::Embed);
    assert!(matches!(
        err,
        QaError::Embedding(EmbedderError::ApiRequestFailed(_))
    ));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_embedder_dropping_vectors_when_handling_then_count_mismatch() {
    let llm = Arc::new(EchoLlmClient::default());
    let qa = service(
        StubFileLoader::with_pages(&["The sky is blue.", "Water is wet."]),
        Arc::new(ShortBatchEmbedder),
        Arc::clone(&llm),
    );

    let result = qa.handle(&document(), "sky?").await;

    assert!(matches!(
        result,
        Err(QaError::Embedding(EmbedderError::CountMismatch {
            expected: 2,
            actual: 1
        }))
    ));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_failing_llm_when_handling_then_generate_stage() {
    let qa = service(
        StubFileLoader::with_pages(&["The sky is blue."]),
        Arc::new(KeywordEmbedder::default()),
        Arc::new(FailingLlmClient),
    );

    let err = qa.handle(&document(), "sky?").await.unwrap_err();

    assert_eq!(err.stage(), Stage::Generate);
    assert!(matches!(
        err,
        QaError::Generation(LlmClientError::RateLimited)
    ));
}

#[test]
fn given_stages_when_displayed_then_lowercase_names() {
    let names: Vec<String> = [
        Stage::Load,
        Stage::Split,
        Stage::Embed,
        Stage::Index,
        Stage::Generate,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    assert_eq!(names, vec!["load", "split", "embed", "index", "generate"]);
}
