//! Request failures and how they turn into responses.
//!
//! Handlers return an [`Error`] built from an [`ErrorKind`]. The kind fixes
//! the status and the default body; a custom message replaces what the
//! client reads, while context and resource only reach the logs.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

const TRACING_TARGET: &str = "fileanalyse_server::handler::error";

/// Result alias used by handlers and extractors.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// A failed request on its way to becoming a response.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
}

impl<'a> Error<'a> {
    /// Starts an error of the given kind with its default message.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            resource: None,
        }
    }

    /// Replaces the message sent to the client.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds diagnostics for the logs.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Names the form field or path segment the error relates to.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&*template.error);

        write!(f, "{} {}: {message}", template.status.as_u16(), template.name)?;
        if let Some(resource) = &self.resource {
            write!(f, " [{resource}]")?;
        }
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut body: ErrorResponse<'_> = self.kind.response();

        if body.status.is_server_error() {
            tracing::error!(target: TRACING_TARGET, error = %self, "request failed");
        } else {
            tracing::debug!(target: TRACING_TARGET, error = %self, "request rejected");
        }

        if let Some(message) = self.message {
            body = body.with_message(message);
        }
        if let Some(context) = self.context {
            body = body.with_context(context);
        }

        body.into_response()
    }
}

impl aide::OperationOutput for Error<'_> {
    type Inner = ErrorResponse<'static>;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        <axum::Json<ErrorResponse<'static>> as aide::OperationOutput>::operation_response(
            ctx, operation,
        )
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Every way a request to this service can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, the multipart body could not be parsed.
    BadRequest,
    /// 400, no `upfile` file part was sent.
    MissingFile,
    /// 404, no route for the path or method.
    NotFound,
    /// 408, the request outlived the configured timeout.
    RequestTimeout,
    /// 413, the file or the whole body is over the limit.
    PayloadTooLarge,
    /// 500, a handler panicked or a layer failed.
    InternalServerError,
}

impl ErrorKind {
    /// Shorthand for `Error::new(self).with_message(..)`.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    /// Shorthand for `Error::new(self).with_context(..)`.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Shorthand for `Error::new(self).with_resource(..)`.
    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    /// Response template: status, format and default message.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingFile => ErrorResponse::MISSING_FILE,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::RequestTimeout => ErrorResponse::REQUEST_TIMEOUT,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}
