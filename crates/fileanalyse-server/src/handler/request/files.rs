//! Uploaded file request types.

use axum::body::Bytes;

/// Content type assumed when a file part does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file buffered from a multipart request.
///
/// Lives for the duration of a single request and is never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename parameter of the part, kept verbatim.
    pub name: String,
    /// Content type of the part.
    pub content_type: String,
    /// File content.
    pub data: Bytes,
}

impl UploadedFile {
    /// Returns the size of the file content in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
