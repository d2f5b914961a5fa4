//! Integration tests for the repository HTTP surface: uploads, downloads,
//! conditional fetches, and directory listings.

mod common;

use http::{header, StatusCode};

use common::*;

#[tokio::test]
async fn test_deploy_then_fetch_round_trip() {
    let (router, _state) = setup(true, false).await;

    // Deploy an artifact with a declared content type
    let response = send(
        &router,
        put(
            "/libs/demo/app/1.0/app-1.0.jar",
            WRITER,
            Some("application/java-archive"),
            b"jar-bytes",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Fetch it back
    let response = send(&router, get("/libs/demo/app/1.0/app-1.0.jar", Some(READER))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/java-archive"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"app-1.0.jar\""
    );
    assert!(response.headers().get(header::ETAG).is_some());
    assert!(response.headers().get(header::LAST_MODIFIED).is_some());
    assert_eq!(body_bytes(response).await.as_ref(), b"jar-bytes");
}

#[tokio::test]
async fn test_fetch_without_declared_type_serves_octet_stream() {
    let (router, _state) = setup(false, false).await;

    send(&router, put("/blobs/raw.bin", WRITER, None, b"raw")).await;

    let response = send(&router, get("/blobs/raw.bin", Some(READER))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_duplicate_upload_is_rejected_with_explanation() {
    let (router, _state) = setup(true, false).await;

    let response = send(&router, put("/libs/app-1.0.jar", WRITER, None, b"original")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = send(&router, put("/libs/app-1.0.jar", WRITER, None, b"overwrite")).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let message = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(message.contains("already inside the repository"));
    assert!(message.contains("unique-artifacts"));

    // The first upload is still served unchanged
    let response = send(&router, get("/libs/app-1.0.jar", Some(READER))).await;
    assert_eq!(body_bytes(response).await.as_ref(), b"original");
}

#[tokio::test]
async fn test_maven_metadata_is_always_overwritable() {
    let (router, _state) = setup(true, false).await;

    for name in [
        "maven-metadata.xml",
        "maven-metadata.xml.sha1",
        "maven-metadata.xml.md5",
    ] {
        let path = format!("/libs/demo/app/{name}");
        let response = send(&router, put(&path, WRITER, None, b"v1")).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let response = send(&router, put(&path, WRITER, None, b"v2")).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED, "{name}");
    }

    let response = send(&router, get("/libs/demo/app/maven-metadata.xml", Some(READER))).await;
    assert_eq!(body_bytes(response).await.as_ref(), b"v2");
}

#[tokio::test]
async fn test_overwrites_allowed_without_unique_flag() {
    let (router, _state) = setup(false, false).await;

    send(&router, put("/libs/app-1.0.jar", WRITER, None, b"one")).await;
    let response = send(&router, put("/libs/app-1.0.jar", WRITER, None, b"two")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = send(&router, get("/libs/app-1.0.jar", Some(READER))).await;
    assert_eq!(body_bytes(response).await.as_ref(), b"two");
}

#[tokio::test]
async fn test_etag_round_trip_yields_not_modified() {
    let (router, _state) = setup(false, false).await;

    send(
        &router,
        put("/libs/app-1.0.pom", WRITER, Some("application/xml"), b"<project/>"),
    )
    .await;

    let response = send(&router, get("/libs/app-1.0.pom", Some(READER))).await;
    let etag = response.headers().get(header::ETAG).unwrap().clone();

    let mut request = get("/libs/app-1.0.pom", Some(READER));
    request.headers_mut().insert(header::IF_NONE_MATCH, etag);
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    // The abbreviated reply repeats the declared content type
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_if_modified_since_round_trip_yields_not_modified() {
    let (router, _state) = setup(false, false).await;

    send(&router, put("/libs/app-1.0.jar", WRITER, None, b"bytes")).await;

    let response = send(&router, get("/libs/app-1.0.jar", Some(READER))).await;
    let last_modified = response.headers().get(header::LAST_MODIFIED).unwrap().clone();

    let mut request = get("/libs/app-1.0.jar", Some(READER));
    request
        .headers_mut()
        .insert(header::IF_MODIFIED_SINCE, last_modified);
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn test_stale_validators_get_full_response() {
    let (router, _state) = setup(false, false).await;

    send(&router, put("/libs/app-1.0.jar", WRITER, None, b"bytes")).await;

    let mut request = get("/libs/app-1.0.jar", Some(READER));
    request
        .headers_mut()
        .insert(header::IF_NONE_MATCH, "\"different-etag\"".parse().unwrap());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), b"bytes");
}

#[tokio::test]
async fn test_configured_cache_control_is_attached_to_responses() {
    let (router, _state) =
        setup_with_cache_control("public, max-age=60", "public, max-age=300").await;

    send(&router, put("/libs/app-1.0.jar", WRITER, None, b"bytes")).await;

    // Full download and the abbreviated 304 both carry the fetch directive
    let response = send(&router, get("/libs/app-1.0.jar", Some(READER))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=300"
    );
    let etag = response.headers().get(header::ETAG).unwrap().clone();

    let mut request = get("/libs/app-1.0.jar", Some(READER));
    request.headers_mut().insert(header::IF_NONE_MATCH, etag);
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=300"
    );

    // Listings carry their own directive
    let response = send(&router, get("/libs/", Some(READER))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=60"
    );
}

#[tokio::test]
async fn test_missing_artifact_is_not_found() {
    let (router, _state) = setup(false, false).await;
    let response = send(&router, get("/libs/no-such.jar", Some(READER))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_directory_is_not_found() {
    let (router, _state) = setup(false, false).await;
    let response = send(&router, get("/no-such-dir/", Some(ADMIN))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_root_listing_is_ok() {
    let (router, _state) = setup(false, false).await;

    let mut request = get("/", Some(LISTER));
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["path"], "/");
    assert_eq!(listing["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_listing_shows_files_and_subdirectories() {
    let (router, _state) = setup(false, false).await;

    for (path, data) in [
        ("/libs/demo/app/1.0/app-1.0.jar", b"jar" as &'static [u8]),
        ("/libs/demo/app/1.0/app-1.0.pom", b"pom-bytes"),
        ("/libs/demo/app/maven-metadata.xml", b"meta"),
    ] {
        let response = send(&router, put(path, WRITER, None, data)).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let mut request = get("/libs/demo/app/", Some(LISTER));
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(response).await;
    assert_eq!(listing["path"], "/libs/demo/app/");
    let entries = listing["entries"].as_array().unwrap();

    let names: Vec<_> = entries
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["1.0/", "maven-metadata.xml"]);

    assert_eq!(entries[0]["is_dir"], true);
    assert_eq!(entries[0]["size"], 0);
    assert_eq!(entries[1]["is_dir"], false);
    assert_eq!(entries[1]["size"], 4);
}

#[tokio::test]
async fn test_listing_renders_html_for_browsers() {
    let (router, _state) = setup(false, false).await;
    send(&router, put("/libs/app-1.0.jar", WRITER, None, b"x")).await;

    let mut request = get("/libs/", Some(LISTER));
    request
        .headers_mut()
        .insert(header::ACCEPT, "text/html,application/xhtml+xml".parse().unwrap());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(html.contains("Index of /libs/"));
    assert!(html.contains("app-1.0.jar"));
    assert!(html.contains("../"));
}

#[tokio::test]
async fn test_warmup_endpoint_needs_no_credentials() {
    let (router, _state) = setup(false, false).await;
    let response = send(&router, get("/_ah/start", None)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (router, _state) = setup(false, false).await;

    let response = send(&router, get("/_status/livez", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, get("/_status/readyz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
