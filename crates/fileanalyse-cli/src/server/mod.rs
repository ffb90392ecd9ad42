//! Binds the listener and runs the router until the process is told to stop.
//!
//! After SIGINT or SIGTERM the server stops accepting connections and gives
//! in-flight requests the configured shutdown timeout to finish.

mod error;
mod signal;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub use self::error::{ServerError, ServerResult};
use self::signal::stop_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves `app` on the configured address until a stop signal arrives.
///
/// # Errors
///
/// Fails when the configuration is invalid, the address cannot be bound or
/// the accept loop breaks.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    config
        .validate()
        .map_err(|err| ServerError::invalid_config(&err))?;

    let address = config.server_addr();
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::BindError { address, source })?;

    let started = Instant::now();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        %address,
        "Listening for connections"
    );

    let draining = Arc::new(Notify::new());
    let grace = config.shutdown_timeout();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_stop(Arc::clone(&draining), grace))
        .into_future();

    tokio::select! {
        result = server => result.map_err(ServerError::Runtime)?,
        () = grace_expired(&draining, grace) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                grace_secs = grace.as_secs(),
                "Grace period over, abandoning in-flight requests"
            );
        }
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = started.elapsed().as_secs(),
        "Server stopped"
    );
    Ok(())
}

/// Resolves once a stop signal arrives, then starts the grace period.
///
/// A failure to install the signal handlers is logged and the server keeps
/// running, since it can still be killed.
async fn wait_for_stop(draining: Arc<Notify>, grace: Duration) {
    match stop_signal().await {
        Ok(signal) => tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            %signal,
            grace_secs = grace.as_secs(),
            "Stop requested, draining connections"
        ),
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "Cannot listen for stop signals"
            );
            std::future::pending::<()>().await;
        }
    }

    draining.notify_one();
}

async fn grace_expired(draining: &Notify, grace: Duration) {
    draining.notified().await;
    tokio::time::sleep(grace).await;
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener as StdListener};

    use super::*;

    #[tokio::test]
    async fn invalid_config_is_rejected_before_binding() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), config).await.unwrap_err();
        assert!(matches!(error, ServerError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn occupied_port_is_a_bind_error() -> anyhow::Result<()> {
        let taken = StdListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        let config = ServerConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: taken.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), config).await.unwrap_err();
        assert!(matches!(error, ServerError::BindError { .. }));
        assert!(error.is_recoverable());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn grace_period_starts_after_stop() {
        let draining = Notify::new();
        let grace = Duration::from_secs(30);

        let expired = grace_expired(&draining, grace);
        tokio::pin!(expired);

        let idle = tokio::time::timeout(Duration::from_secs(60), &mut expired).await;
        assert!(idle.is_err());

        draining.notify_one();
        let started = tokio::time::Instant::now();
        expired.await;
        assert!(started.elapsed() >= grace);
    }
}
