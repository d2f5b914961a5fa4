use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use common::auth::{Role, SecurityContext};
use common::repo::Directory;
use common::storage::StorageError;
use http::{HeaderMap, StatusCode};

use crate::http::auth::{self, AuthError};
use crate::ServiceState;

/// Roles allowed to browse directory listings.
const LIST_ROLES: &[Role] = &[Role::Write, Role::Read, Role::List];

#[derive(Template)]
#[template(path = "listing.html")]
struct ListingTemplate {
    path: String,
    show_parent: bool,
    rows: Vec<ListingRow>,
}

struct ListingRow {
    href: String,
    name: String,
    size: String,
    created: String,
}

/// Listing for the repository root; the only level that renders even when
/// the bucket is empty.
pub async fn root_handler(
    State(state): State<ServiceState>,
    context: Option<Extension<SecurityContext>>,
    headers: HeaderMap,
) -> Response {
    handler(&state, context.as_deref(), &headers, "")
        .await
        .into_response()
}

/// Reconstruct one directory level from the flat key space and render it
/// as HTML or JSON depending on the Accept header.
pub async fn handler(
    state: &ServiceState,
    context: Option<&SecurityContext>,
    headers: &HeaderMap,
    path: &str,
) -> Result<Response, ListError> {
    auth::require_any_role(context, LIST_ROLES)?;

    let page = state.storage().list_dir(path).await?;
    let directory =
        Directory::assemble(format!("/{path}"), path, page).ok_or(ListError::NotFound)?;

    let mut response = if wants_json(headers) {
        Json(directory).into_response()
    } else {
        listing_page(directory).into_response()
    };

    if let Some(value) = state.cache_control_list() {
        response
            .headers_mut()
            .insert(http::header::CACHE_CONTROL, value.clone());
    }

    Ok(response)
}

fn listing_page(directory: Directory) -> ListingTemplate {
    let show_parent = directory.path != "/";
    let rows = directory
        .entries
        .into_iter()
        .map(|entry| ListingRow {
            href: entry.name.clone(),
            size: if entry.is_dir {
                "-".to_string()
            } else {
                entry.size.to_string()
            },
            created: entry
                .created
                .map(|created| created.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            name: entry.name,
        })
        .collect();

    ListingTemplate {
        path: directory.path,
        show_parent,
        rows,
    }
}

/// Check if the Accept header indicates JSON is preferred over HTML.
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(|accept| {
            let json_pos = accept.find("application/json");
            let html_pos = accept.find("text/html");
            match (json_pos, html_pos) {
                (Some(j), Some(h)) => j < h,
                (Some(_), None) => true,
                _ => false,
            }
        })
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("directory not found")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::NotFound => {
                (StatusCode::NOT_FOUND, "directory not found").into_response()
            }
            ListError::Auth(error) => error.into_response(),
            ListError::Storage(error) => {
                tracing::error!(%error, "directory listing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error".to_string())
                    .into_response()
            }
        }
    }
}
