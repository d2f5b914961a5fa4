//! Credential storage and principal resolution.

mod context;
mod store;
mod user;

pub use context::{resolve, Resolution, SecurityContext};
pub use store::{CredentialStore, ANONYMOUS_TOKEN};
pub use user::{Role, UnknownRole, User, UserEntry};
