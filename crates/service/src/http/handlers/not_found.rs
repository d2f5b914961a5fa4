use askama::Template;
use askama_axum::IntoResponse;
use axum::response::Response;
use axum::Json;
use http::{HeaderMap, StatusCode};

#[derive(Template)]
#[template(path = "pages/not_found.html")]
struct NotFoundTemplate {}

/// Fallback for requests matching no route, content-negotiated the same
/// way as the repository listing.
pub async fn not_found_handler(headers: HeaderMap) -> Response {
    let accept = headers
        .get(http::header::ACCEPT)
        .and_then(|value| value.to_str().ok());

    match accept {
        Some(accept) if accept.contains("application/json") => {
            let body = serde_json::json!({"msg": "no such path in this repository"});
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Some(accept) if accept.contains("text/html") => {
            (StatusCode::NOT_FOUND, NotFoundTemplate {}).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            [(http::header::CONTENT_TYPE, "text/plain")],
            "no such path in this repository",
        )
            .into_response(),
    }
}
