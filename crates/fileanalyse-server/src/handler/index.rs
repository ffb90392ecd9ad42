//! Landing page with an upload form.

use aide::axum::ApiRouter;
use axum::response::Html;
use axum::routing::get;

use crate::service::ServiceState;

/// Embedded landing page.
const INDEX_PAGE: &str = include_str!("../../assets/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Returns a [`Router`] with the landing page route.
///
/// The page is not part of the API and is left out of the OpenAPI document.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().route("/", get(index))
}
