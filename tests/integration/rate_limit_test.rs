// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use super::helpers::{
    activities_reply, create_test_server, test_settings, PageBehavior, StaticLlm, StubRenderer,
    SEARCH_PAGE,
};

fn forwarded(ip: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_str(ip).unwrap(),
    )
}

fn server(rate_limiting_enabled: bool) -> (TestServer, Arc<StubRenderer>) {
    let mut settings = test_settings();
    settings.rate_limiting.enabled = rate_limiting_enabled;

    let renderer = StubRenderer::new(PageBehavior::Html(SEARCH_PAGE));
    let server = create_test_server(
        renderer.clone(),
        Arc::new(StaticLlm(activities_reply(1))),
        settings,
    );
    (server, renderer)
}

async fn scrape(server: &TestServer, ip: Option<&str>) -> axum_test::TestResponse {
    let mut request = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }));
    if let Some(ip) = ip {
        let (name, value) = forwarded(ip);
        request = request.add_header(name, value);
    }
    request.await
}

#[tokio::test]
async fn test_sixth_request_is_rejected() {
    let (server, renderer) = server(true);

    for i in 0..5 {
        let response = scrape(&server, Some("203.0.113.5")).await;
        assert_eq!(response.status_code(), StatusCode::OK, "request {}", i + 1);
    }

    let response = scrape(&server, Some("203.0.113.5")).await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "error": "Too many requests. Please try again later." })
    );

    // rejected requests never reach the browser
    assert_eq!(renderer.calls(), 5);
}

#[tokio::test]
async fn test_clients_have_separate_buckets() {
    let (server, _) = server(true);

    for _ in 0..5 {
        scrape(&server, Some("203.0.113.5, 10.0.0.2")).await;
    }
    assert_eq!(
        scrape(&server, Some("203.0.113.5")).await.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        scrape(&server, Some("203.0.113.6")).await.status_code(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_unidentified_clients_share_one_bucket() {
    let (server, _) = server(true);

    for _ in 0..5 {
        assert_eq!(scrape(&server, None).await.status_code(), StatusCode::OK);
    }
    assert_eq!(
        scrape(&server, None).await.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        scrape(&server, Some("192.0.2.1")).await.status_code(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_invalid_requests_count_against_the_limit() {
    let (server, _) = server(true);

    for _ in 0..5 {
        let response = server
            .post("/api/scrape")
            .add_header(forwarded("203.0.113.9").0, forwarded("203.0.113.9").1)
            .json(&json!({}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(
        scrape(&server, Some("203.0.113.9")).await.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_disabled_rate_limiting_admits_everything() {
    let (server, renderer) = server(false);

    for _ in 0..8 {
        assert_eq!(
            scrape(&server, Some("203.0.113.5")).await.status_code(),
            StatusCode::OK
        );
    }
    assert_eq!(renderer.calls(), 8);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let (server, _) = server(true);

    for _ in 0..10 {
        server.get("/health").await.assert_status_ok();
    }
}
