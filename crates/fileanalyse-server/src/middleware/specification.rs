//! OpenAPI document and Scalar reference page.
//!
//! [`aide`] collects the documented routes of an [`ApiRouter`]; the finished
//! document is served as JSON and rendered by Scalar.
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

const DEFAULT_JSON_PATH: &str = "/api/openapi.json";
const DEFAULT_SCALAR_PATH: &str = "/api/scalar";

/// Where the API documentation is mounted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path of the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openapi-json-path",
            env = "OPENAPI_JSON_PATH",
            default_value = DEFAULT_JSON_PATH
        )
    )]
    pub open_api_json: String,

    /// Path of the Scalar reference page.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openapi-scalar-path",
            env = "OPENAPI_SCALAR_PATH",
            default_value = DEFAULT_SCALAR_PATH
        )
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: DEFAULT_JSON_PATH.to_owned(),
            scalar_ui: DEFAULT_SCALAR_PATH.to_owned(),
        }
    }
}

fn api_info() -> Info {
    Info {
        title: "File Metadata API".to_owned(),
        summary: Some("Reports the metadata of an uploaded file".to_owned()),
        description: Some(
            "Upload a single file as `multipart/form-data` and receive its original \
             name, declared MIME type and size in bytes. Uploaded content is never stored."
                .to_owned(),
        ),
        license: Some(License {
            name: "MIT".to_owned(),
            identifier: Some("MIT".to_owned()),
            ..License::default()
        }),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Info::default()
    }
}

async fn openapi_json(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
    Json(api)
}

/// Extension trait for [`ApiRouter`] that finishes the OpenAPI document.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Mounts the JSON document and the Scalar page, turning the documented
    /// router into a plain [`Router`].
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let mut api = OpenApi {
            info: api_info(),
            ..OpenApi::default()
        };

        self.route(
            &config.scalar_ui,
            Scalar::new(&config.open_api_json).axum_route(),
        )
        .route(&config.open_api_json, get(openapi_json))
        .finish_api(&mut api)
        .layer(Extension(api))
    }
}
