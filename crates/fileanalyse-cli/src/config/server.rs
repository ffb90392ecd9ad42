//! Listener address and shutdown settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::{Result, ensure};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
const SHUTDOWN_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;

/// Where the server listens and how long it drains on shutdown.
///
/// ```bash
/// fileanalyse --host 127.0.0.1 --port 8080
/// HOST=127.0.0.1 PORT=8080 fileanalyse
/// ```
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to bind, `0.0.0.0` for every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    #[serde(default = "unspecified_host")]
    pub host: IpAddr,

    /// TCP port to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a stop signal (1-300).
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    pub shutdown_timeout: u64,
}

fn unspecified_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: unspecified_host(),
            port: DEFAULT_PORT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// Fails on port 0 or a shutdown timeout outside 1-300 seconds.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.port != 0, "port must not be 0");
        ensure!(
            SHUTDOWN_TIMEOUT_RANGE.contains(&self.shutdown_timeout),
            "shutdown timeout of {}s is outside {}-{}s",
            self.shutdown_timeout,
            SHUTDOWN_TIMEOUT_RANGE.start(),
            SHUTDOWN_TIMEOUT_RANGE.end()
        );
        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Ports below 1024 usually need elevated privileges.
    #[must_use]
    pub const fn is_privileged_port(&self) -> bool {
        self.port < 1024
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            address = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );

        if self.host.is_unspecified() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                host = %self.host,
                "Listening on every network interface"
            );
        }

        if self.is_privileged_port() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                port = self.port,
                "Privileged port, binding may need elevated permissions"
            );
        }
    }
}
