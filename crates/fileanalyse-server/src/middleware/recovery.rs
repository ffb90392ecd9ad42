//! Turns handler panics and slow requests into responses.
//!
//! A panic becomes `500 Something broke!` and a request still running after
//! the configured timeout becomes `408 Request timed out`. The panic payload
//! is logged and never returned to the client.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::ErrorKind;
use crate::{Error, Result};

const TRACING_TARGET: &str = "fileanalyse_server::middleware::recovery";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Per-request time budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may run before it is answered with 408 (1-300).
    #[cfg_attr(
        feature = "config",
        arg(
            long = "request-timeout",
            env = "REQUEST_TIMEOUT",
            default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

impl RecoveryConfig {
    pub fn with_timeout_secs(request_timeout_secs: u64) -> Self {
        Self {
            request_timeout_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects timeouts outside of 1 to 300 seconds.
    pub fn validate(&self) -> Result<()> {
        match self.request_timeout_secs {
            1..=MAX_REQUEST_TIMEOUT_SECS => Ok(()),
            secs => Err(Error::invalid_setting(
                "request_timeout",
                format!("{secs} seconds is outside of 1-{MAX_REQUEST_TIMEOUT_SECS}"),
            )),
        }
    }
}

/// Extension trait for `axum::`[`Router`] adding panic and timeout recovery.
pub trait RouterRecoveryExt<S> {
    /// Wraps the router so that panics and timeouts still produce a response.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        self.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(layer_error_response))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
    }
}

fn layer_error_response(err: tower::BoxError) -> BoxFuture<'static, Response> {
    let error = if err.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET, "request timed out");
        ErrorKind::RequestTimeout.with_context("request exceeded the configured timeout")
    } else {
        ErrorKind::InternalServerError.with_context(format!("middleware failed: {err}"))
    };

    future::ready(error.into_response()).boxed()
}

/// Readable part of a panic payload, if it carried a message.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else {
        "non-string panic payload"
    }
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(&*payload);
    tracing::error!(target: TRACING_TARGET, panic = %message, "handler panicked");

    ErrorKind::InternalServerError
        .with_context(format!("handler panicked: {message}"))
        .into_response()
}
