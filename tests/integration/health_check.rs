// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use datespot::config::settings::Settings;
use datespot::domain::services::activity_search_service::{ActivitySearchService, SearchOptions};
use datespot::domain::services::extraction_service::LlmActivityExtractor;
use datespot::infrastructure::services::rate_limiting_service_impl::InMemoryRateLimiter;
use datespot::presentation::routes::{self, AppState};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

use super::helpers::{PageBehavior, StaticLlm, StubRenderer};

fn app() -> axum::Router {
    let settings = Settings::default();
    let search = Arc::new(ActivitySearchService::new(
        StubRenderer::new(PageBehavior::Crash),
        Arc::new(LlmActivityExtractor::new(
            Arc::new(StaticLlm(json!({}))),
            1_000,
        )),
        SearchOptions::from(&settings.scraper),
    ));

    routes::routes(AppState {
        limiter: Arc::new(InMemoryRateLimiter::default()),
        search,
        settings: Arc::new(settings),
    })
}

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], env!("CARGO_PKG_VERSION").as_bytes());
}

#[tokio::test]
async fn scrape_only_accepts_post() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/scrape")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
