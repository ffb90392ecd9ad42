//! Request extractors with error handling aligned to the HTTP [`Error`] type.
//!
//! The extractors here wrap their axum counterparts and turn rejections into
//! [`Error`] values, so a failed extraction produces the same response shape
//! as any handler failure.
//!
//! [`Error`]: crate::handler::Error

pub mod reject;

pub use crate::extract::reject::Multipart;
