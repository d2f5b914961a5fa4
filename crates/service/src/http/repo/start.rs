use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Warmup request issued by managed runtimes before traffic arrives.
/// Always accepted, no credentials required.
#[tracing::instrument]
pub async fn handler() -> Response {
    StatusCode::ACCEPTED.into_response()
}
