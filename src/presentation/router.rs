use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{FileLoader, LlmClient, TextSplitter};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{answer_handler, index_handler};
use crate::presentation::state::AppState;

pub fn create_router<F, L, T>(state: AppState<F, L, T>) -> Router
where
    F: FileLoader + 'static,
    L: LlmClient + 'static + ?Sized,
    T: TextSplitter + 'static + ?Sized,
{
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1/answer", post(answer_handler::<F, L, T>))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
