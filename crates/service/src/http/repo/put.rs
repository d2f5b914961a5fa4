use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use bytes::Bytes;
use common::auth::{Role, SecurityContext};
use common::repo::is_mutable_metadata;
use common::storage::StorageError;
use http::{HeaderMap, StatusCode};

use crate::http::auth::{self, AuthError};
use crate::ServiceState;

/// Uploading requires the write role alone.
const PUT_ROLES: &[Role] = &[Role::Write];

const DUPLICATE_ARTIFACT_WARNING: &str = "The uploaded artifact is already inside the repository. \
     If you want to overwrite the artifact, you have to disable the 'unique-artifacts' flag";

/// Store an uploaded artifact under its request path.
///
/// With unique artifacts enabled, a key that already holds a blob is
/// rejected unless it is a Maven metadata file; repeated deploys rewrite
/// those by design of the repository format. The existence check and the
/// write are separate calls, so a concurrent upload can still slip
/// through; the last writer wins in that case.
pub async fn handler(
    State(state): State<ServiceState>,
    context: Option<Extension<SecurityContext>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PutError> {
    auth::require_any_role(context.as_deref(), PUT_ROLES)?;

    if state.unique_artifacts()
        && !is_mutable_metadata(&path)
        && state.storage().exists(&path).await?
    {
        tracing::info!(key = %path, "{}", DUPLICATE_ARTIFACT_WARNING);
        return Err(PutError::Duplicate);
    }

    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    state.storage().put(&path, content_type, body).await?;

    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error("artifact already exists")]
    Duplicate,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for PutError {
    fn into_response(self) -> Response {
        match self {
            PutError::Duplicate => {
                (StatusCode::NOT_ACCEPTABLE, DUPLICATE_ARTIFACT_WARNING).into_response()
            }
            PutError::Auth(error) => error.into_response(),
            PutError::Storage(error) => {
                tracing::error!(%error, "artifact upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error".to_string())
                    .into_response()
            }
        }
    }
}
