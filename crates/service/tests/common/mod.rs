//! Shared test utilities for repository server integration tests
#![allow(dead_code)]

use std::io::Write;

use axum::body::{to_bytes, Body};
use axum::Router;
use bytes::Bytes;
use http::{header, HeaderValue, Request, Response};
use tempfile::NamedTempFile;

use service::{Config, ServiceState};

// Authorization header values matching the credentials file below.
pub const ADMIN: &str = "Basic YWRtaW46aHVudGVyMg=="; // admin:hunter2
pub const WRITER: &str = "Basic d3JpdGVyOnctcGFzcw=="; // writer:w-pass
pub const READER: &str = "Basic cmVhZGVyOnItcGFzcw=="; // reader:r-pass
pub const LISTER: &str = "Basic bGlzdGVyOmwtcGFzcw=="; // lister:l-pass
pub const UNKNOWN: &str = "Basic Z2hvc3Q6d3JvbmctcGFzcw=="; // not in the file

const CREDENTIALS: &str = r#"
[[user]]
username = "admin"
password = "hunter2"
roles = ["write", "read", "list"]

[[user]]
username = "writer"
password = "w-pass"
roles = ["write"]

[[user]]
username = "reader"
password = "r-pass"
roles = ["read"]

[[user]]
username = "lister"
password = "l-pass"
roles = ["list"]
"#;

const ANONYMOUS_READ: &str = r#"
[[user]]
username = "*"
password = "*"
roles = ["read", "list"]
"#;

/// Bring up a router over in-memory storage with the standard credential
/// set. `unique_artifacts` controls the duplicate-upload guard;
/// `anonymous` adds a wildcard read/list account.
pub async fn setup(unique_artifacts: bool, anonymous: bool) -> (Router, ServiceState) {
    let config = Config {
        unique_artifacts,
        ..Config::default()
    };
    build(config, anonymous).await
}

/// Same in-memory setup with `Cache-Control` directives configured for
/// listing and fetch responses.
pub async fn setup_with_cache_control(list: &str, fetch: &str) -> (Router, ServiceState) {
    let config = Config {
        cache_control_list: Some(list.to_string()),
        cache_control_fetch: Some(fetch.to_string()),
        ..Config::default()
    };
    build(config, false).await
}

async fn build(mut config: Config, anonymous: bool) -> (Router, ServiceState) {
    let mut credentials = NamedTempFile::new().unwrap();
    write!(credentials, "{}", CREDENTIALS).unwrap();
    if anonymous {
        write!(credentials, "{}", ANONYMOUS_READ).unwrap();
    }
    config.credentials_path = Some(credentials.path().to_path_buf());

    let state = ServiceState::from_config(&config).await.unwrap();
    let router = service::http::router(state.clone(), tracing::Level::INFO);
    (router, state)
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    use tower::ServiceExt;

    router.clone().oneshot(request).await.unwrap()
}

pub fn get(path: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Like [`get`], with an `Authorization` value built from raw bytes.
pub fn get_with_auth_bytes(path: &str, auth: &[u8]) -> Request<Body> {
    let mut request = get(path, None);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, HeaderValue::from_bytes(auth).unwrap());
    request
}

pub fn put(
    path: &str,
    auth: &str,
    content_type: Option<&str>,
    data: &'static [u8],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::AUTHORIZATION, auth);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(data)).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
