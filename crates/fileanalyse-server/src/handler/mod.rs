//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod fileanalyse;
mod index;
mod request;
mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::fileanalyse::UPLOAD_FIELD;
pub use crate::handler::request::{DEFAULT_CONTENT_TYPE, UploadedFile};
pub use crate::handler::response::{ErrorFormat, ErrorResponse, FileMetadata};
use crate::service::ServiceState;

/// Responds to unmatched paths and methods.
#[inline]
pub async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
///
/// Fallbacks are not included: install [`fallback`] on the final router for
/// both unmatched paths and unmatched methods.
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(index::routes())
        .merge(fileanalyse::routes(state.upload_limits))
}

#[cfg(test)]
pub(crate) mod test {
    use axum::Router;
    use axum_test::TestServer;

    use crate::handler::{fallback, routes};
    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router
            .fallback(fallback)
            .method_not_allowed_fallback(fallback)
            .with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and the given config.
    pub fn create_test_server_with_config(config: &ServiceConfig) -> anyhow::Result<TestServer> {
        let state = ServiceState::from_config(config)?;
        let router = routes(state.clone()).into();
        create_test_server_with_state(router, state)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_config(&ServiceConfig::default())
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/unknown").await;
        response.assert_status_not_found();
        response.assert_text("Sorry, can't find that!");
        Ok(())
    }
}
