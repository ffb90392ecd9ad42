//! Command-line and environment configuration.
//!
//! Every setting is a flag with an environment variable fallback; a `.env`
//! file is read first when the `dotenv` feature is on.
//!
//! ```bash
//! fileanalyse --port 8080 --max-file-size 1048576
//! PORT=8080 MAX_FILE_SIZE=1048576 fileanalyse
//! ```

mod middleware;
mod server;

use anyhow::Context;
use clap::Parser;
use fileanalyse_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "fileanalyse", version)]
#[command(about = "Reports the name, type and size of an uploaded file")]
pub struct Cli {
    #[clap(flatten)]
    pub server: ServerConfig,

    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Parses the command line after loading `.env`, so the file only fills
    /// in variables the environment does not already set.
    pub fn init() -> Self {
        load_dotenv();
        Self::parse()
    }

    /// Installs the global subscriber, filtered by `RUST_LOG` (default `info`).
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// # Errors
    ///
    /// Names the first section holding an invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.validate().context("server")?;
        self.middleware.validate().context("middleware")?;
        self.service.validate().context("upload service")?;
        Ok(())
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = std::process::id(),
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            dotenv = cfg!(feature = "dotenv"),
            "Process information"
        );

        self.server.log();
        self.middleware.log();
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_file_size = self.service.max_file_size,
            "Upload configuration"
        );
    }
}

#[cfg(feature = "dotenv")]
fn load_dotenv() {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => eprintln!("Warning: cannot read .env file: {err}"),
        _ => {}
    }
}

#[cfg(not(feature = "dotenv"))]
fn load_dotenv() {}
