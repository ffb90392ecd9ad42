//! Settings for the middleware stack wrapped around the upload routes.
//!
//! The types live in `fileanalyse-server`; this struct only flattens them
//! into the command line.

use clap::Args;
use fileanalyse_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[clap(flatten)]
    pub cors: CorsConfig,

    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// # Errors
    ///
    /// Fails when the request timeout is out of range.
    pub fn validate(&self) -> fileanalyse_server::Result<()> {
        self.recovery.validate()
    }

    pub fn log(&self) {
        if self.cors.allows_any_origin() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "No CORS origins listed, every origin is allowed"
            );
        } else {
            tracing::info!(
                target: TRACING_TARGET_CONFIG,
                origins = ?self.cors.allowed_origins,
                credentials = self.cors.allow_credentials,
                "CORS origins"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            document = %self.openapi.open_api_json,
            reference = %self.openapi.scalar_ui,
            request_timeout_secs = self.recovery.request_timeout_secs,
            "Middleware configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let config = MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(0),
            ..MiddlewareConfig::default()
        };

        let error = config.validate().unwrap_err();
        assert_eq!(error.setting(), "request_timeout");
    }
}
