//! Multipart extractor that rejects with the HTTP [`Error`].
//!
//! A request that cannot hold a file part is reported as a missing file:
//! either its content type is not `multipart/form-data` with a boundary, or
//! its body is known to be empty. Anything else the inner extractor rejects
//! is a bad request.

use axum::body::HttpBody;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::header::CONTENT_LENGTH;
use derive_more::{Deref, DerefMut, From};

use crate::handler::{Error, ErrorKind};

/// Multipart extractor with improved error handling.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let empty_body = has_empty_body(&req);
        let multipart = AxumMultipart::from_request(req, state).await?;

        // The multipart parser treats a zero-length stream as truncated.
        if empty_body {
            return Err(ErrorKind::MissingFile.with_context("Multipart request has an empty body"));
        }

        Ok(Self(multipart))
    }
}

/// Whether the request declares or carries no body bytes at all.
fn has_empty_body(req: &Request) -> bool {
    let declared_empty = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        == Some(0);

    declared_empty || req.body().size_hint().exact() == Some(0)
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::MissingFile.with_context(
                "Content-Type is not multipart/form-data or has no boundary parameter",
            ),
            _ => ErrorKind::BadRequest
                .with_context(format!("Multipart extraction failed: {rejection}")),
        }
    }
}

impl aide::OperationInput for Multipart {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        <AxumMultipart as aide::OperationInput>::operation_input(ctx, operation);
    }
}
