use std::sync::Arc;

use crate::application::ports::{FileLoader, LlmClient, TextSplitter};
use crate::application::services::QaService;

pub struct AppState<F, L: ?Sized, T: ?Sized>
where
    F: FileLoader,
    L: LlmClient,
    T: TextSplitter,
{
    pub qa_service: Arc<QaService<F, L, T>>,
    pub max_upload_bytes: usize,
}

impl<F, L: ?Sized, T: ?Sized> AppState<F, L, T>
where
    F: FileLoader,
    L: LlmClient,
    T: TextSplitter,
{
    pub fn new(qa_service: QaService<F, L, T>, max_upload_bytes: usize) -> Self {
        Self {
            qa_service: Arc::new(qa_service),
            max_upload_bytes,
        }
    }
}

impl<F, L: ?Sized, T: ?Sized> Clone for AppState<F, L, T>
where
    F: FileLoader,
    L: LlmClient,
    T: TextSplitter,
{
    fn clone(&self) -> Self {
        Self {
            qa_service: Arc::clone(&self.qa_service),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
