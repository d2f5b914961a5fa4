//! Directory reconstruction from one-level blob listings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::BlobMeta;

/// One listing row: a file or sub-directory directly under the listed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Name relative to the listing root; sub-directories keep their
    /// trailing slash.
    pub name: String,
    /// Size in bytes; zero for directory entries.
    pub size: u64,
    /// Creation time, when the store reports one.
    pub created: Option<DateTime<Utc>>,
    /// Whether the entry denotes a sub-directory.
    pub is_dir: bool,
}

/// One reconstructed level of the repository hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// Request path the listing was built for.
    pub path: String,
    /// Entries in the order the store returned them.
    pub entries: Vec<FileEntry>,
}

impl Directory {
    /// Build one listing level from a page of blob metadata scoped to
    /// `prefix`.
    ///
    /// The blob whose key equals `prefix` (the directory marker itself) is
    /// skipped; every other key is emitted with the prefix stripped. Returns
    /// `None` when a non-root prefix produced no entries, meaning the caller
    /// asked for a sub-path that does not exist. The root prefix is always
    /// valid, even over an empty bucket.
    pub fn assemble(path: impl Into<String>, prefix: &str, page: Vec<BlobMeta>) -> Option<Self> {
        let mut entries = Vec::with_capacity(page.len());

        for blob in page {
            if blob.key == prefix {
                continue;
            }
            let name = match blob.key.strip_prefix(prefix) {
                Some(rest) => rest.to_string(),
                None => blob.key,
            };
            entries.push(FileEntry {
                name,
                size: blob.size,
                created: blob.created,
                is_dir: blob.is_dir,
            });
        }

        if !prefix.is_empty() && entries.is_empty() {
            return None;
        }

        Some(Directory {
            path: path.into(),
            entries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
