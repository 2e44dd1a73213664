//! Fetch relay integration tests
//!
//! - GET /fetch?url=... streams the upstream body back
//! - Scheme and URL validation
//! - Upstream status passthrough and network failures
//! - Byte cap truncation

use axum::http::{header, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;
use wiremock::{
    matchers::{header as header_is, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::{spawn_chunked_upstream, test_config, test_server, unreachable_url};

async fn upstream_with(route: &str, template: ResponseTemplate) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(&upstream)
        .await;
    upstream
}

#[tokio::test]
async fn test_fetch_relays_body_and_content_type() {
    let upstream = upstream_with(
        "/data.csv",
        ResponseTemplate::new(200).set_body_raw("a,b\n1,2\n", "text/csv"),
    )
    .await;
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/data.csv", upstream.uri()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.text(), "a,b\n1,2\n");
}

#[tokio::test]
async fn test_fetch_sends_fixed_user_agent_and_no_caller_headers() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header_is("User-Agent", "Mozilla/5.0 (LocalFetcher)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&upstream)
        .await;
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/page", upstream.uri()))
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"))
        .add_header(header::COOKIE, HeaderValue::from_static("session=abc"))
        .await;

    response.assert_status_ok();
    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    assert!(received[0].headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_fetch_defaults_content_type() {
    let upstream = upstream_with(
        "/blob",
        ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2, 3]),
    )
    .await;
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/blob", upstream.uri()))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(response.as_bytes().to_vec(), vec![0u8, 1, 2, 3]);
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/new", upstream.uri())),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/plain"))
        .mount(&upstream)
        .await;
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/old", upstream.uri()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "moved");
}

#[tokio::test]
async fn test_fetch_relays_upstream_error_status() {
    let upstream = upstream_with("/missing", ResponseTemplate::new(404)).await;
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/missing", upstream.uri()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let json: Value = response.json();
    assert_eq!(json["error"]["message"], "Upstream 404");
}

#[tokio::test]
async fn test_fetch_missing_url_is_bad_request() {
    let server = test_server(test_config(&unreachable_url()));

    let response = server.get("/fetch").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"]["message"].as_str().unwrap().contains("Missing"));
}

#[tokio::test]
async fn test_fetch_rejects_non_http_schemes_without_network_call() {
    let server = test_server(test_config(&unreachable_url()));

    for target in ["file:///etc/passwd", "ftp://example.com/file", "gopher://example.com"] {
        let response = server.get("/fetch").add_query_param("url", target).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert!(
            json["error"]["message"].as_str().unwrap().contains("http/https"),
            "unexpected message for {}",
            target
        );
    }
}

#[tokio::test]
async fn test_fetch_malformed_url_is_bad_request() {
    let server = test_server(test_config(&unreachable_url()));

    let response = server.get("/fetch").add_query_param("url", "not a url").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"]["message"].as_str().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_fetch_network_failure_is_bad_gateway() {
    let server = test_server(test_config(&unreachable_url()));

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/anything", unreachable_url()))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: Value = response.json();
    assert!(json.get("error").is_some());
    assert_eq!(json["error"]["message"], "Fetch failed");
}

#[tokio::test]
async fn test_fetch_body_over_cap_is_truncated() {
    let cap = 1000;
    let payload: Vec<u8> = (0..16 * 256).map(|i| (i % 251) as u8).collect();
    let upstream = spawn_chunked_upstream(payload.clone(), 256).await;
    let mut config = test_config(&unreachable_url());
    config.max_fetch_bytes = cap;
    let server = test_server(config);

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/stream", upstream))
        .await;

    response.assert_status_ok();
    let body = response.as_bytes().to_vec();
    // Three whole chunks fit, the fourth would cross the cap and is dropped
    assert!(!body.is_empty());
    assert_eq!(body.len(), 3 * 256);
    assert_eq!(body, payload[..body.len()].to_vec());
}

#[tokio::test]
async fn test_fetch_single_oversized_body_is_cut() {
    let cap = 1024;
    let upstream = upstream_with(
        "/big",
        ResponseTemplate::new(200).set_body_raw(vec![b'x'; 64 * 1024], "text/plain"),
    )
    .await;
    let mut config = test_config(&unreachable_url());
    config.max_fetch_bytes = cap;
    let server = test_server(config);

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/big", upstream.uri()))
        .await;

    response.assert_status_ok();
    assert!(response.as_bytes().len() as u64 <= cap);
}

#[tokio::test]
async fn test_fetch_body_at_cap_is_complete() {
    let cap = 4096;
    let payload = vec![b'y'; cap as usize];
    let upstream = upstream_with(
        "/exact",
        ResponseTemplate::new(200).set_body_raw(payload.clone(), "text/plain"),
    )
    .await;
    let mut config = test_config(&unreachable_url());
    config.max_fetch_bytes = cap;
    let server = test_server(config);

    let response = server
        .get("/fetch")
        .add_query_param("url", format!("{}/exact", upstream.uri()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().to_vec(), payload);
}
