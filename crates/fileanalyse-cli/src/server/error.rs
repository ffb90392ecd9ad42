//! Startup and runtime failures of the HTTP server.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Why the server could not start or stopped on its own.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot listen on {address}: {source}")]
    BindError {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server stopped unexpectedly: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    pub fn invalid_config(err: &anyhow::Error) -> Self {
        Self::InvalidConfig(format!("{err:#}"))
    }

    /// Stable code logged next to the error.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "SERVER_CONFIG",
            Self::BindError { .. } => "SERVER_BIND",
            Self::Runtime(_) => "SERVER_RUNTIME",
        }
    }

    /// What the operator can change to get past this error, if anything.
    pub fn suggestion(&self) -> Option<&'static str> {
        let suggestion = match self {
            Self::InvalidConfig(_) => {
                "Run with --help to review the accepted flags and environment variables"
            }
            Self::BindError { source, .. } => match source.kind() {
                io::ErrorKind::AddrInUse => {
                    "Another process holds this port, choose a different --port"
                }
                io::ErrorKind::PermissionDenied => {
                    "Ports below 1024 need elevated privileges, choose a higher --port"
                }
                io::ErrorKind::AddrNotAvailable => {
                    "The --host address is not assigned to a local interface"
                }
                _ => return None,
            },
            Self::Runtime(_) => return None,
        };

        Some(suggestion)
    }

    /// Whether a restart with a changed environment could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BindError { .. }) && self.suggestion().is_some()
    }
}
