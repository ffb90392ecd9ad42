//! Uploaded file response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::request::UploadedFile;

/// Metadata reported for an uploaded file.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileMetadata {
    /// Original filename as sent by the client.
    pub name: String,
    /// MIME type declared by the client.
    #[serde(rename = "type")]
    pub content_type: String,
    /// File size in bytes.
    pub size: u64,
}

impl From<&UploadedFile> for FileMetadata {
    fn from(file: &UploadedFile) -> Self {
        Self {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
        }
    }
}
