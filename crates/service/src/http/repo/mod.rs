use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use common::auth::SecurityContext;
use http::HeaderMap;

mod fetch;
mod list;
mod put;
mod start;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/_ah/start", get(start::handler))
        .route("/", get(list::root_handler))
        .route("/*path", get(dispatch_get).put(put::handler))
        .with_state(state)
}

/// A trailing slash selects the directory listing, anything else the
/// artifact itself.
async fn dispatch_get(
    State(state): State<ServiceState>,
    context: Option<Extension<SecurityContext>>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    if path.ends_with('/') {
        list::handler(&state, context.as_deref(), &headers, &path)
            .await
            .into_response()
    } else {
        fetch::handler(&state, context.as_deref(), &headers, &path)
            .await
            .into_response()
    }
}
