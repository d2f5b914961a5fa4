use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{HeaderMapExt, LastModified};
use common::auth::{Role, SecurityContext};
use common::storage::StorageError;
use http::{HeaderMap, StatusCode};

use crate::http::auth::{self, AuthError};
use crate::http::conditional;
use crate::ServiceState;

/// Roles allowed to download artifacts.
const FETCH_ROLES: &[Role] = &[Role::Write, Role::Read];

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stream one artifact, honoring conditional request headers.
///
/// Metadata is read first so a `304 Not Modified` never pulls the blob
/// body from the backend. The abbreviated response repeats the declared
/// content type when the blob carries one and stays silent otherwise.
pub async fn handler(
    state: &ServiceState,
    context: Option<&SecurityContext>,
    headers: &HeaderMap,
    path: &str,
) -> Result<Response, FetchError> {
    auth::require_any_role(context, FETCH_ROLES)?;

    let meta = state
        .storage()
        .head(path)
        .await?
        .ok_or(FetchError::NotFound)?;

    let etag = meta.etag.as_deref().and_then(conditional::entity_tag);
    let last_modified = meta.created.map(conditional::timestamp);

    let mut response_headers = HeaderMap::new();
    if let Some(value) = state.cache_control_fetch() {
        response_headers.insert(http::header::CACHE_CONTROL, value.clone());
    }

    if conditional::not_modified(headers, etag.as_ref(), last_modified) {
        if let Some(content_type) = meta.content_type.as_deref() {
            if let Ok(value) = content_type.parse() {
                response_headers.insert(http::header::CONTENT_TYPE, value);
            }
        }
        return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
    }

    let (_, stream) = state
        .storage()
        .get(path)
        .await?
        .ok_or(FetchError::NotFound)?;

    let content_type = meta.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
    if let Ok(value) = content_type.parse() {
        response_headers.insert(http::header::CONTENT_TYPE, value);
    }

    let filename = path.rsplit('/').next().unwrap_or(path);
    if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
        response_headers.insert(http::header::CONTENT_DISPOSITION, value);
    }

    if let Some(etag) = etag {
        response_headers.typed_insert(etag);
    }
    if let Some(last_modified) = last_modified {
        response_headers.typed_insert(LastModified::from(last_modified));
    }

    Ok((StatusCode::OK, response_headers, Body::from_stream(stream)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("artifact not found")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        match self {
            FetchError::NotFound => {
                (StatusCode::NOT_FOUND, "artifact not found").into_response()
            }
            FetchError::Auth(error) => error.into_response(),
            FetchError::Storage(error) => {
                tracing::error!(%error, "artifact fetch failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error".to_string())
                    .into_response()
            }
        }
    }
}
