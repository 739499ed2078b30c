use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::application::ports::{FileLoader, LlmClient, TextSplitter};
use crate::application::services::{QaError, Stage};
use crate::domain::Document;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

const FILE_FIELD: &str = "file";
const QUERY_FIELD: &str = "query";
const PDF_MIME: &str = "application/pdf";

#[derive(Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'static str>,
}

struct Upload {
    filename: String,
    data: Bytes,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            stage: None,
        }),
    )
        .into_response()
}

fn stage_status(stage: Stage) -> StatusCode {
    match stage {
        Stage::Load => StatusCode::UNPROCESSABLE_ENTITY,
        Stage::Embed | Stage::Generate => StatusCode::BAD_GATEWAY,
        Stage::Split | Stage::Index => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn qa_error_response(err: &QaError) -> Response {
    let stage = err.stage();
    (
        stage_status(stage),
        Json(ErrorResponse {
            error: err.to_string(),
            stage: Some(stage.as_str()),
        }),
    )
        .into_response()
}

fn is_pdf_upload(filename: &str, content_type: Option<&str>) -> bool {
    Document::is_pdf_name(filename)
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_MIME))
}

/// Writes the upload to a `qbot-*.pdf` temp file, removed when dropped.
async fn store_upload(data: &Bytes) -> std::io::Result<NamedTempFile> {
    let temp = tokio::task::spawn_blocking(|| {
        tempfile::Builder::new()
            .prefix("qbot-")
            .suffix(".pdf")
            .tempfile()
    })
    .await
    .map_err(std::io::Error::other)??;

    tokio::fs::write(temp.path(), data).await?;
    Ok(temp)
}

/// Answers `query` about the PDF uploaded in `file`. The upload lives in a
/// temporary file for the duration of the request.
#[tracing::instrument(skip(state, multipart))]
pub async fn answer_handler<F, L, T>(
    State(state): State<AppState<F, L, T>>,
    mut multipart: Multipart,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static + ?Sized,
    T: TextSplitter + 'static + ?Sized,
{
    let mut upload: Option<Upload> = None;
    let mut query: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(
                    e.status(),
                    format!("Failed to read multipart: {}", e.body_text()),
                );
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);

                if !is_pdf_upload(&filename, content_type.as_deref()) {
                    tracing::warn!(
                        filename = %filename,
                        content_type = content_type.as_deref().unwrap_or("unknown"),
                        "Rejected non-PDF upload"
                    );
                    return error_response(
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        format!("Only PDF uploads are supported, got '{filename}'"),
                    );
                }

                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read file bytes");
                        return error_response(
                            e.status(),
                            format!("Failed to read file: {}", e.body_text()),
                        );
                    }
                };

                upload = Some(Upload { filename, data });
            }
            Some(QUERY_FIELD) => match field.text().await {
                Ok(text) => query = Some(text),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read query field");
                    return error_response(
                        e.status(),
                        format!("Failed to read query: {}", e.body_text()),
                    );
                }
            },
            other => {
                tracing::debug!(field = other.unwrap_or("unnamed"), "Ignoring multipart field");
            }
        }
    }

    let Some(upload) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    let query = match query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Query must not be empty"),
    };

    tracing::debug!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        query = %sanitize_prompt(&query),
        "Processing question"
    );

    let temp = match store_upload(&upload.data).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "Failed to store upload");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload");
        }
    };

    let document = Document::new(upload.filename, temp.path());

    match state.qa_service.handle(&document, &query).await {
        Ok(answer) => (StatusCode::OK, Json(AnswerResponse { answer })).into_response(),
        Err(e) => {
            match e.stage() {
                Stage::Load => tracing::warn!(error = %e, stage = %e.stage(), "Question failed"),
                _ => tracing::error!(error = %e, stage = %e.stage(), "Question failed"),
            }
            qa_error_response(&e)
        }
    }
}
