#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process::ExitCode;

use anyhow::Context;
use axum::Router;
use fileanalyse_server::handler::{fallback, routes};
use fileanalyse_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use fileanalyse_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

pub const TRACING_TARGET_SERVER_STARTUP: &str = "fileanalyse_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "fileanalyse_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "fileanalyse_cli::config";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if tracing::enabled!(target: TRACING_TARGET_SERVER_SHUTDOWN, tracing::Level::ERROR) {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %format_args!("{error:#}"),
                    "Exiting with an error"
                );
            } else {
                eprintln!("Error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "Starting fileanalyse"
    );
    cli.log();
    cli.validate().context("invalid configuration")?;

    let state = ServiceState::from_config(&cli.service)?;
    let app = create_router(state, &cli.middleware);

    server::serve(app, cli.server).await.map_err(|error| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            code = error.error_code(),
            recoverable = error.is_recoverable(),
            suggestion = error.suggestion(),
            "Server failed"
        );
        anyhow::Error::new(error)
    })
}

/// The upload routes and their docs behind the full middleware stack.
///
/// Security is innermost so its headers land on every handler response,
/// including the 404 fallback; recovery is outermost so a panic or timeout
/// anywhere below still gets a JSON body.
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state.clone())
        .with_open_api(middleware.openapi.clone())
        .fallback(fallback)
        .method_not_allowed_fallback(fallback)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
        .with_state(state)
}
