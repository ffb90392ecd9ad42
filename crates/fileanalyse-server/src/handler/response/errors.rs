use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// How an [`ErrorResponse`] is written to the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    /// `{"error": "<message>"}`
    #[default]
    Json,
    /// The message alone, as `text/plain`.
    PlainText,
}

/// Error body sent to the client.
///
/// Only `error` is serialized; the other fields drive logging and the
/// status line.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
    pub error: Cow<'a, str>,

    #[serde(skip)]
    pub name: Cow<'a, str>,
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip)]
    pub format: ErrorFormat,
}

impl<'a> ErrorResponse<'a> {
    pub const BAD_REQUEST: Self = Self::json(
        "bad_request",
        "Invalid multipart request",
        StatusCode::BAD_REQUEST,
    );
    pub const MISSING_FILE: Self =
        Self::json("missing_file", "No file uploaded", StatusCode::BAD_REQUEST);
    pub const PAYLOAD_TOO_LARGE: Self = Self::json(
        "payload_too_large",
        "File too large",
        StatusCode::PAYLOAD_TOO_LARGE,
    );

    pub const NOT_FOUND: Self = Self::text(
        "not_found",
        "Sorry, can't find that!",
        StatusCode::NOT_FOUND,
    );
    pub const REQUEST_TIMEOUT: Self = Self::text(
        "request_timeout",
        "Request timed out",
        StatusCode::REQUEST_TIMEOUT,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::text(
        "internal_server_error",
        "Something broke!",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    pub const fn new(
        name: &'a str,
        message: &'a str,
        status: StatusCode,
        format: ErrorFormat,
    ) -> Self {
        Self {
            error: Cow::Borrowed(message),
            name: Cow::Borrowed(name),
            context: None,
            status,
            format,
        }
    }

    const fn json(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self::new(name, message, status, ErrorFormat::Json)
    }

    const fn text(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self::new(name, message, status, ErrorFormat::PlainText)
    }

    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.error = message.into();
        self
    }

    /// Appends to the logged context, `"; "`-separated.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(previous) => format!("{previous}; {context}").into(),
            None => context,
        });
        self
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        match self.format {
            ErrorFormat::Json => (self.status, Json(self)).into_response(),
            ErrorFormat::PlainText => (self.status, self.error.into_owned()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn last_message_wins() {
        let response = ErrorResponse::BAD_REQUEST
            .with_message("Unreadable part")
            .with_message("Truncated stream");

        assert_eq!(response.error, "Truncated stream");
    }

    #[test]
    fn contexts_accumulate() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("handler panicked")
            .with_context("connection closed");

        assert_eq!(
            response.context.as_deref(),
            Some("handler panicked; connection closed")
        );
    }

    #[test]
    fn only_the_message_is_serialized() {
        let response = ErrorResponse::MISSING_FILE.with_context("no upfile part");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "error": "No file uploaded" }));
    }

    #[tokio::test]
    async fn json_format_body() {
        let response = ErrorResponse::PAYLOAD_TOO_LARGE.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"File too large"}"#);
    }

    #[tokio::test]
    async fn plain_text_format_body() {
        let response = ErrorResponse::NOT_FOUND.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            response.headers()[CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Sorry, can't find that!");
    }
}
