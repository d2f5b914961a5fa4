use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Access roles a repository account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Upload artifacts (implies download and listing access on the routes
    /// that accept it).
    Write,
    /// Download artifacts.
    Read,
    /// Browse directory listings.
    List,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Write => "write",
            Role::Read => "read",
            Role::List => "list",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write" => Ok(Role::Write),
            "read" => Ok(Role::Read),
            "list" => Ok(Role::List),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A configured account, keyed by its transport-encoded credential.
///
/// Accounts are built from configuration before the server starts serving
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque token matched verbatim against `Authorization: Basic <token>`.
    pub authentication: String,
    /// Display identity; `*` for the anonymous account.
    pub principal: String,
    /// Roles granted to this account.
    pub roles: HashSet<Role>,
}

impl User {
    pub fn new(
        authentication: impl Into<String>,
        principal: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            authentication: authentication.into(),
            principal: principal.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// One `[[user]]` table from the credentials file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserEntry {
    /// Convert to the stored form. The token is `base64("user:pass")`,
    /// exactly the value a Basic-authenticating client puts on the wire.
    pub fn into_user(self) -> User {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        User {
            authentication: token,
            principal: self.username,
            roles: self.roles.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Write, Role::Read, Role::List] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn entry_encodes_wire_token() {
        let entry = UserEntry {
            username: "deploy".to_string(),
            password: "s3cret".to_string(),
            roles: vec![Role::Write, Role::Read],
        };
        let user = entry.into_user();

        // base64("deploy:s3cret")
        assert_eq!(user.authentication, "ZGVwbG95OnMzY3JldA==");
        assert_eq!(user.principal, "deploy");
        assert!(user.has_role(Role::Write));
        assert!(user.has_role(Role::Read));
        assert!(!user.has_role(Role::List));
    }

    #[test]
    fn roles_deserialize_snake_case() {
        let entry: UserEntry =
            serde_json::from_str(r#"{"username": "ci", "password": "x", "roles": ["read", "list"]}"#)
                .unwrap();
        assert_eq!(entry.roles, vec![Role::Read, Role::List]);
    }
}
