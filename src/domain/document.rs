use std::path::{Path, PathBuf};

use super::chunk::DocumentId;

/// An uploaded file as seen by a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub path: PathBuf,
}

impl Document {
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: DocumentId::new(),
            filename: filename.into(),
            path: path.into(),
        }
    }

    /// Builds a document named after the last component of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(filename, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_pdf_name(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}
