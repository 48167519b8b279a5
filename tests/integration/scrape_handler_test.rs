// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use datespot::config::settings::LlmSettings;
use datespot::domain::services::llm_service::LLMService;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{
    activities_reply, create_test_server, test_settings, PageBehavior, StaticLlm, StubRenderer,
    SEARCH_PAGE,
};

fn client(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

/// 具体场景：首次请求 picnic + Lisbon
#[tokio::test]
async fn test_picnic_in_lisbon() {
    let renderer = StubRenderer::new(PageBehavior::Html(SEARCH_PAGE));
    let server = create_test_server(
        renderer.clone(),
        Arc::new(StaticLlm(activities_reply(2))),
        test_settings(),
    );

    let (name, value) = client("198.51.100.10");
    let response = server
        .post("/api/scrape")
        .add_header(name, value)
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let search_url = body["data"]["searchUrl"].as_str().unwrap();
    assert!(search_url.contains("q=picnic+Lisbon"));

    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Picnic experience 1");
    assert_eq!(
        results[0]["url"],
        "https://www.getyourguide.com/lisbon-l42/picnic-t1/"
    );
    assert_eq!(results[0]["price"], "€30");
    assert_eq!(results[0]["rating"], 4.5);
    assert!(results[0].get("image").is_none());

    assert_eq!(renderer.calls(), 1);
    assert_eq!(renderer.last_url().unwrap().as_str(), search_url);
}

#[tokio::test]
async fn test_results_are_capped_at_five() {
    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(StaticLlm(activities_reply(9))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_url_query_is_used_when_slug_is_missing() {
    let renderer = StubRenderer::new(PageBehavior::Html(SEARCH_PAGE));
    let server = create_test_server(
        renderer.clone(),
        Arc::new(StaticLlm(activities_reply(1))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "url": "https://www.getyourguide.com/s/?q=museum+Paris" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["data"]["searchUrl"]
        .as_str()
        .unwrap()
        .ends_with("?q=museum+Paris"));
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn test_missing_activity_or_location_is_400() {
    let renderer = StubRenderer::new(PageBehavior::Html(SEARCH_PAGE));
    let server = create_test_server(
        renderer.clone(),
        Arc::new(StaticLlm(activities_reply(1))),
        test_settings(),
    );

    for body in [
        json!({}),
        json!({ "slug": "picnic" }),
        json!({ "url": "https://www.getyourguide.com/s/?q=picnic" }),
    ] {
        let response = server.post("/api/scrape").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
        let error: Value = response.json();
        assert_eq!(error, json!({ "error": "Missing activity or location" }));
    }

    assert_eq!(renderer.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(StaticLlm(activities_reply(1))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": 42, "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn test_zero_activities_is_still_success() {
    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(StaticLlm(json!({ "activities": [] }))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "stargazing", "city": "Reykjavik" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["results"], json!([]));
    assert!(!body["data"]["searchUrl"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_navigation_timeout_returns_search_placeholder() {
    let server = create_test_server(
        StubRenderer::new(PageBehavior::Timeout),
        Arc::new(StaticLlm(activities_reply(3))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["url"], body["data"]["searchUrl"]);
}

#[tokio::test]
async fn test_browser_crash_returns_empty_results() {
    let server = create_test_server(
        StubRenderer::new(PageBehavior::Crash),
        Arc::new(StaticLlm(activities_reply(3))),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["results"], json!([]));
}

#[tokio::test]
async fn test_invalid_search_base_is_500() {
    let mut settings = test_settings();
    settings.scraper.search_base_url = "not a url".to_string();

    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(StaticLlm(activities_reply(1))),
        settings,
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid search base URL"));
}

/// 通过 wiremock 模拟 LLM 接口，验证完整的提取链路
#[tokio::test]
async fn test_extraction_through_llm_api() {
    let llm_server = MockServer::start().await;
    let reply = json!({
        "activities": [
            { "title": "Gourmet picnic in Monsanto", "url": "/lisbon-l42/picnic-t1/", "price": "€45" },
            { "title": "Sunset picnic by the river", "url": "/lisbon-l42/picnic-t2/", "rating": "4.9" },
            { "title": "", "url": "/lisbon-l42/broken/" }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply.to_string() } }],
            "usage": { "prompt_tokens": 900, "completion_tokens": 80, "total_tokens": 980 }
        })))
        .expect(1)
        .mount(&llm_server)
        .await;

    let llm = LLMService::new(&LlmSettings {
        api_key: Some("sk-test".to_string()),
        api_base_url: llm_server.uri(),
        ..LlmSettings::default()
    })
    .unwrap();

    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(llm),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["price"], "€45");
    assert!(results[1]["rating"].as_f64().unwrap() > 4.8);
}

#[tokio::test]
async fn test_llm_failure_degrades_to_empty_results() {
    let llm_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&llm_server)
        .await;

    let llm = LLMService::new(&LlmSettings {
        api_key: Some("sk-test".to_string()),
        api_base_url: llm_server.uri(),
        ..LlmSettings::default()
    })
    .unwrap();

    let server = create_test_server(
        StubRenderer::new(PageBehavior::Html(SEARCH_PAGE)),
        Arc::new(llm),
        test_settings(),
    );

    let response = server
        .post("/api/scrape")
        .json(&json!({ "slug": "picnic", "city": "Lisbon" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["results"], json!([]));
    assert!(body["data"]["searchUrl"]
        .as_str()
        .unwrap()
        .contains("q=picnic+Lisbon"));
}
