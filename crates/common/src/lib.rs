//! Domain core for the Silo artifact repository.
//!
//! Everything here is independent of the HTTP layer:
//! - [`auth`]: credential table, user/role model, and the resolver that maps
//!   an `Authorization` header value to a principal.
//! - [`repo`]: directory reconstruction over a flat key namespace, plus the
//!   mutable-metadata rule used by the upload guard.
//! - [`storage`]: thin wrapper over pluggable `object_store` backends
//!   (S3/MinIO, local filesystem, in-memory).

pub mod auth;
pub mod repo;
pub mod storage;

// Re-export key types for convenience
pub use auth::{CredentialStore, Resolution, Role, SecurityContext, User};
pub use repo::Directory;
pub use storage::{Storage, StorageConfig};
