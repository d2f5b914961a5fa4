//! Hierarchical repository semantics over a flat key namespace.

mod directory;
mod metadata;

pub use directory::{Directory, FileEntry};
pub use metadata::is_mutable_metadata;
