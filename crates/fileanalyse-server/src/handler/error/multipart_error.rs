//! Conversion of multipart stream failures into [`Error`].

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use crate::handler::{Error, ErrorKind};

impl From<MultipartError> for Error<'static> {
    fn from(error: MultipartError) -> Self {
        // The body limit surfaces as a multipart error once the stream is read.
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ErrorKind::PayloadTooLarge
                .with_message("File too large")
                .with_context(format!("Request body exceeds the limit: {}", error.body_text()));
        }

        ErrorKind::BadRequest
            .with_message("Invalid multipart request")
            .with_context(format!("Multipart parsing failed: {}", error.body_text()))
    }
}
