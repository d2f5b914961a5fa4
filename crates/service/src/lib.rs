//! HTTP service for the Silo artifact repository.
//!
//! This crate wires the domain core from `common` into an axum application:
//! - Configuration and shared state ([`config`], [`state`])
//! - The router, security-context middleware, and repository handlers
//!   ([`http`])

pub mod config;
pub mod http;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, ConfigError};
pub use state::{State as ServiceState, StateSetupError};
