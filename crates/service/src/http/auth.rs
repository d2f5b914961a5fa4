use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use common::auth::{resolve, Resolution, Role, SecurityContext};
use http::StatusCode;
use rand::Rng;

use crate::ServiceState;

/// Upper bound for the randomized delay applied to failed credentials, in
/// milliseconds.
const MAX_MITIGATION_DELAY_MS: u64 = 2000;

/// Resolve the request's `Authorization` header into a [`SecurityContext`]
/// and attach it as a request extension.
///
/// Requests that do not resolve to a known user proceed without a context;
/// blocking them is the responsibility of the individual handlers. A failed
/// credential that looks like a real login attempt is slowed down by a
/// random delay before the request continues, so probing the credential set
/// costs the caller time.
pub async fn resolve_security_context(
    State(state): State<ServiceState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request.headers().get(http::header::AUTHORIZATION).cloned();

    let resolution = match authorization.as_ref() {
        Some(value) => match value.to_str() {
            Ok(header) => resolve(state.credentials(), Some(header)),
            Err(_) => Resolution::None {
                mitigate: non_trivial_basic_token(value.as_bytes()),
            },
        },
        None => resolve(state.credentials(), None),
    };

    match resolution {
        Resolution::Principal(user) => {
            let secure = request.uri().scheme_str() == Some("https");
            request
                .extensions_mut()
                .insert(SecurityContext::new(user, secure));
        }
        Resolution::None { mitigate } => {
            if mitigate {
                let delay = rand::rng().random_range(0..MAX_MITIGATION_DELAY_MS);
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }
        }
    }

    next.run(request).await
}

/// Token shape check for header values that fail UTF-8 validation. Such
/// bytes can never match a stored token, but a failed non-trivial `Basic`
/// credential still has to pay the mitigation delay.
fn non_trivial_basic_token(header: &[u8]) -> bool {
    let Some(rest) = header.strip_prefix(b"Basic") else {
        return false;
    };
    rest.get(1..).unwrap_or_default().len() > 1
}

/// Reject the request unless the caller holds at least one of `roles`.
///
/// A missing context yields 401 so clients get prompted for credentials; a
/// present context without the role yields 403.
pub fn require_any_role(
    context: Option<&SecurityContext>,
    roles: &[Role],
) -> Result<(), AuthError> {
    match context {
        None => Err(AuthError::Unauthorized),
        Some(context) if context.has_any_role(roles) => Ok(()),
        Some(context) => Err(AuthError::Forbidden {
            principal: context.principal().to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthorized,
    #[error("user '{principal}' lacks the required role")]
    Forbidden { principal: String },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(http::header::WWW_AUTHENTICATE, "Basic realm=\"silo\"")],
                "authentication required",
            )
                .into_response(),
            AuthError::Forbidden { .. } => {
                (StatusCode::FORBIDDEN, "insufficient permissions").into_response()
            }
        }
    }
}
