//! Resolution of `Authorization` header values against the credential table.

use super::store::CredentialStore;
use super::user::{Role, User};

/// The only authentication scheme accepted on the wire.
const BASIC: &str = "Basic";

/// Outcome of resolving an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A configured account matched, either by explicit credentials or via
    /// the anonymous sentinel on a credential-less request.
    Principal(User),
    /// No account matched. `mitigate` is set when a non-trivial Basic
    /// credential was presented and failed; the caller must then delay its
    /// response to slow down credential enumeration.
    None { mitigate: bool },
}

/// Per-request security context handed to the authorization layer.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    user: User,
    secure: bool,
}

impl SecurityContext {
    pub fn new(user: User, secure: bool) -> Self {
        Self { user, secure }
    }

    pub fn principal(&self) -> &str {
        &self.user.principal
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.user.has_role(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.user.has_role(*role))
    }

    /// Whether the request arrived over an encrypted transport.
    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

/// Resolve a raw `Authorization` header value against the store.
///
/// An absent header falls back to the anonymous sentinel. A `Basic` header
/// is matched verbatim as an opaque token after the scheme and a single
/// separator character; the token is never decoded into `user:password`.
/// Any other scheme resolves to no principal. Malformed input degrades to
/// no principal rather than failing.
pub fn resolve(store: &CredentialStore, authorization: Option<&str>) -> Resolution {
    let Some(authorization) = authorization else {
        return match store.anonymous() {
            Some(user) => Resolution::Principal(user.clone()),
            None => Resolution::None { mitigate: false },
        };
    };

    let Some(rest) = authorization.strip_prefix(BASIC) else {
        return Resolution::None { mitigate: false };
    };

    // Skip the single separator after the scheme. A bare `Basic` header
    // yields an empty token, not an error.
    let token = rest.get(1..).unwrap_or_default();

    match store.lookup(token) {
        Some(user) => Resolution::Principal(user.clone()),
        None => Resolution::None {
            mitigate: token.len() > 1,
        },
    }
}
