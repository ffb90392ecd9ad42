//! CORS, hardening response headers and compression.
//!
//! Body size limits live on the upload route itself, see
//! [`UploadLimits`](crate::service::UploadLimits).

use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::http::header::{self, HeaderName, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

const TRACING_TARGET: &str = "fileanalyse_server::middleware::security";

const DEFAULT_CORS_MAX_AGE_SECS: u64 = 3600;

/// Lets the landing page and the API reference pull their assets from the
/// public CDNs they use.
const DEFAULT_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
    style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net https://fonts.googleapis.com; \
    font-src 'self' data: https://cdn.jsdelivr.net https://fonts.gstatic.com; \
    img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'; \
    base-uri 'self'; form-action 'self'";

/// Extension trait for `axum::`[`Router`] adding CORS and response hardening.
pub trait RouterSecurityExt<S> {
    /// Applies CORS, the headers from `headers` and response compression.
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self {
        headers
            .response_headers()
            .into_iter()
            .fold(self, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
            .layer(cors.to_layer())
            .layer(CompressionLayer::new())
    }
}

/// Which browser origins may call the API.
///
/// An empty origin list behaves like a permissive `cors()`: every origin is
/// allowed and credentials never are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// Comma-separated allowed origins; empty allows any origin.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-origins", env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Seconds a browser may cache a preflight answer.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cors-max-age",
            env = "CORS_MAX_AGE",
            default_value_t = DEFAULT_CORS_MAX_AGE_SECS
        )
    )]
    #[serde(default = "default_cors_max_age_secs")]
    pub max_age_seconds: u64,

    /// Send `Access-Control-Allow-Credentials`; needs explicit origins.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-allow-credentials", env = "CORS_ALLOW_CREDENTIALS")
    )]
    #[serde(default)]
    pub allow_credentials: bool,
}

const fn default_cors_max_age_secs() -> u64 {
    DEFAULT_CORS_MAX_AGE_SECS
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: DEFAULT_CORS_MAX_AGE_SECS,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns whether any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }

    /// Parses the configured origins, dropping the ones that are not valid
    /// header values.
    fn origins(&self) -> Vec<HeaderValue> {
        let mut origins = Vec::with_capacity(self.allowed_origins.len());
        for origin in &self.allowed_origins {
            match HeaderValue::from_str(origin.trim()) {
                Ok(value) => origins.push(value),
                Err(_) => tracing::warn!(
                    target: TRACING_TARGET,
                    origin = %origin,
                    "Dropping unparsable CORS origin"
                ),
            }
        }
        origins
    }

    /// Builds the [`CorsLayer`] for this configuration.
    pub fn to_layer(&self) -> CorsLayer {
        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .max_age(Duration::from_secs(self.max_age_seconds));

        if !self.allows_any_origin() {
            return base
                .allow_origin(self.origins())
                .allow_credentials(self.allow_credentials);
        }

        if self.allow_credentials {
            tracing::warn!(
                target: TRACING_TARGET,
                "Ignoring CORS credentials because every origin is allowed"
            );
        }
        base.allow_origin(AllowOrigin::any())
    }
}

/// Hardening headers added to every response.
///
/// `X-Content-Type-Options: nosniff` is always sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// `Content-Security-Policy` value; `None` leaves it unset.
    pub content_security_policy: Option<String>,
    pub frame_options: FrameOptions,
    pub referrer_policy: ReferrerPolicy,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            content_security_policy: Some(DEFAULT_CONTENT_SECURITY_POLICY.to_owned()),
            frame_options: FrameOptions::Deny,
            referrer_policy: ReferrerPolicy::StrictOriginWhenCrossOrigin,
        }
    }
}

impl SecurityHeadersConfig {
    /// Header pairs to set on responses, skipping an unparsable policy.
    fn response_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(self.frame_options.as_str()),
            ),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static(self.referrer_policy.as_str()),
            ),
        ];

        if let Some(policy) = &self.content_security_policy {
            match HeaderValue::from_str(policy) {
                Ok(value) => headers.push((header::CONTENT_SECURITY_POLICY, value)),
                Err(error) => tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Dropping unparsable content security policy"
                ),
            }
        }

        headers
    }
}

/// `X-Frame-Options` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOptions {
    Deny,
    SameOrigin,
}

impl FrameOptions {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// `Referrer-Policy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    NoReferrer,
    SameOrigin,
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::SameOrigin => "same-origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}
