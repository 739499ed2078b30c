use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use qbot::application::ports::Embedder;
use qbot::application::services::{AnswerGenerator, QaService, QaSettings};
use qbot::infrastructure::llm::{GeminiClient, GeminiEmbedder};
use qbot::infrastructure::observability::{TracingConfig, init_tracing};
use qbot::infrastructure::text_processing::{PdfAdapter, RecursiveCharacterSplitter};
use qbot::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;
    let addr = settings
        .server
        .socket_addr()
        .context("Invalid server host/port")?;

    init_tracing(&TracingConfig::new(environment, &settings.logging), addr)?;

    if settings.gemini.api_key.is_none() {
        tracing::warn!(
            "No Gemini API key configured; requests will fail until GOOGLE_API_KEY is set"
        );
    }

    let retry = settings.retry.policy();
    let timeout = settings.gemini.request_timeout();

    let embedder: Arc<dyn Embedder> = Arc::new(
        GeminiEmbedder::new(settings.gemini.api_key.clone(), &settings.embeddings.model)
            .with_base_url(&settings.gemini.base_url)
            .with_batch_size(settings.embeddings.batch_size)
            .with_timeout(timeout)
            .with_retry(retry),
    );

    let llm_client = Arc::new(
        GeminiClient::new(settings.gemini.api_key.clone(), &settings.llm.model)
            .with_base_url(&settings.gemini.base_url)
            .with_timeout(timeout)
            .with_retry(retry),
    );

    let text_splitter = Arc::new(RecursiveCharacterSplitter::new(
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
    ));

    let qa_service = QaService::new(
        Arc::new(PdfAdapter::new()),
        text_splitter,
        embedder,
        AnswerGenerator::new(llm_client, settings.llm.generation_params()),
        QaSettings {
            top_k: settings.retrieval.top_k,
            distance_metric: settings.retrieval.distance_metric,
        },
    );

    let state = AppState::new(qa_service, settings.server.max_upload_bytes());
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router).await?;

    Ok(())
}
