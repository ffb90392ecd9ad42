//! Shared request state derived from [`ServiceConfig`].

mod config;
mod upload_limits;

pub use crate::service::config::ServiceConfig;
pub use crate::service::upload_limits::{MULTIPART_OVERHEAD, UploadLimits};
use crate::Result;

/// State handed to every handler.
///
/// Built once at startup and cloned into each request; handlers pull the
/// pieces they need through [`FromRef`].
///
/// [`FromRef`]: axum::extract::FromRef
#[derive(Debug, Clone)]
#[must_use = "state does nothing unless attached to a router"]
pub struct ServiceState {
    pub upload_limits: UploadLimits,
}

impl ServiceState {
    /// Validates `config` and derives the request limits from it.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            upload_limits: config.upload_limits()?,
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(upload_limits: UploadLimits);
