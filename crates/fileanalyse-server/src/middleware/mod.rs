//! Router extension traits wrapping the API in its middleware stack.
//!
//! [`RouterOpenApiExt`] finishes the documented [`ApiRouter`]; the other
//! traits layer a plain [`Router`], innermost first:
//!
//! 1. [`RouterSecurityExt`]: CORS, hardening headers, compression
//! 2. [`RouterObservabilityExt`]: request ids and trace spans
//! 3. [`RouterRecoveryExt`]: panics and request timeouts
//!
//! ```rust,no_run
//! use axum::Router;
//! use fileanalyse_server::middleware::{
//!     CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt,
//!     RouterSecurityExt, SecurityHeadersConfig,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Router`]: axum::Router

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
