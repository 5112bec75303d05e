//! Uploaded file handed to the orchestrator

use std::io::Read;

/// An uploaded tabular file
///
/// `file_name` carries the declared type (its extension). The reader is
/// consumed exactly once.
pub struct Upload<R: Read> {
    pub file_name: String,
    pub content_type: Option<String>,
    pub reader: R,
}

impl<R: Read> Upload<R> {
    pub fn new(file_name: impl Into<String>, reader: R) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            reader,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Lowercased extension of the declared file name
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}
