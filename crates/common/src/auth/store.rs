//! In-memory credential table, loaded once at startup.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::user::User;

/// Token granting public access when present in the store: the Basic
/// encoding of the reserved `*:*` credential.
pub static ANONYMOUS_TOKEN: LazyLock<String> = LazyLock::new(|| STANDARD.encode("*:*"));

/// Mapping from transport-encoded credential to account record.
///
/// Populated before the server starts serving and read-only afterwards.
/// Shared across request tasks behind an `Arc`; no interior mutability.
#[derive(Debug, Default, Clone)]
pub struct CredentialStore {
    users: HashMap<String, User>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account keyed by its authentication token. A later insert
    /// with the same token replaces the earlier one.
    pub fn add(&mut self, user: User) {
        self.users.insert(user.authentication.clone(), user);
    }

    /// Insert accounts in input order; later entries win on token collisions.
    pub fn add_all(&mut self, users: impl IntoIterator<Item = User>) {
        for user in users {
            self.add(user);
        }
    }

    pub fn lookup(&self, token: &str) -> Option<&User> {
        self.users.get(token)
    }

    /// The account the anonymous sentinel resolves to, if one is configured.
    pub fn anonymous(&self) -> Option<&User> {
        self.users.get(ANONYMOUS_TOKEN.as_str())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user::Role;

    fn user(token: &str, principal: &str, roles: &[Role]) -> User {
        User::new(token, principal, roles.iter().copied())
    }

    #[test]
    fn anonymous_token_is_the_encoded_sentinel() {
        // base64("*:*")
        assert_eq!(ANONYMOUS_TOKEN.as_str(), "Kjoq");
    }

    #[test]
    fn lookup_finds_added_users() {
        let mut store = CredentialStore::new();
        store.add(user("tok-a", "alpha", &[Role::Read]));

        assert_eq!(store.lookup("tok-a").unwrap().principal, "alpha");
        assert!(store.lookup("tok-b").is_none());
    }

    #[test]
    fn last_write_wins_on_duplicate_tokens() {
        let mut store = CredentialStore::new();
        store.add_all([
            user("tok", "first", &[Role::Read]),
            user("tok", "second", &[Role::Write]),
        ]);

        assert_eq!(store.len(), 1);
        let resolved = store.lookup("tok").unwrap();
        assert_eq!(resolved.principal, "second");
        assert!(resolved.has_role(Role::Write));
        assert!(!resolved.has_role(Role::Read));
    }

    #[test]
    fn anonymous_resolves_only_when_configured() {
        let mut store = CredentialStore::new();
        assert!(store.anonymous().is_none());

        store.add(user(ANONYMOUS_TOKEN.as_str(), "*", &[Role::List]));
        assert_eq!(store.anonymous().unwrap().principal, "*");
    }
}
