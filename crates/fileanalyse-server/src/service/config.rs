//! Service configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::service::UploadLimits;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default maximum upload size: 10 MiB.
    pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Maximum size in bytes of the uploaded file.
    ///
    /// Larger uploads are rejected with 413 Payload Too Large.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_FILE_SIZE", default_value_t = defaults::MAX_FILE_SIZE)
    )]
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

const fn default_max_file_size() -> u64 {
    defaults::MAX_FILE_SIZE
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_file_size: defaults::MAX_FILE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration with the given upload limit in bytes.
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(Error::invalid_setting("max_file_size", "must be greater than 0"));
        }

        Ok(())
    }

    /// Derives the request limits enforced by the upload handler.
    pub fn upload_limits(&self) -> Result<UploadLimits> {
        self.validate()?;
        UploadLimits::new(self.max_file_size)
    }
}
