//! Conditional-request evaluation for artifact fetches.
//!
//! `If-None-Match` takes precedence over `If-Modified-Since`; the date check
//! only runs when the client sent no entity tag at all. Timestamps are
//! compared at whole-second resolution because HTTP dates carry no finer
//! precision than that.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum_extra::headers::{ETag, HeaderMapExt, IfModifiedSince, IfNoneMatch};
use chrono::{DateTime, Utc};
use http::HeaderMap;

/// Decide whether the request can be answered with `304 Not Modified`.
pub fn not_modified(
    headers: &HeaderMap,
    etag: Option<&ETag>,
    last_modified: Option<SystemTime>,
) -> bool {
    if let Some(if_none_match) = headers.typed_get::<IfNoneMatch>() {
        return match etag {
            Some(etag) => !if_none_match.precondition_passes(etag),
            None => false,
        };
    }

    match (headers.typed_get::<IfModifiedSince>(), last_modified) {
        (Some(if_modified_since), Some(last_modified)) => {
            !if_modified_since.is_modified(last_modified)
        }
        _ => false,
    }
}

/// Normalize a backend entity tag into header form.
///
/// Backends disagree on quoting: S3 returns the tag already quoted while
/// the in-memory and filesystem stores hand back the bare value. Tags with
/// characters that are invalid in a header are dropped rather than served.
pub fn entity_tag(raw: &str) -> Option<ETag> {
    let bare = raw.trim_matches('"');
    format!("\"{bare}\"").parse().ok()
}

/// Convert a blob timestamp to a `SystemTime` truncated to whole seconds.
pub fn timestamp(created: DateTime<Utc>) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(created.timestamp().max(0) as u64)
}
