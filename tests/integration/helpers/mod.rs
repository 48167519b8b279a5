// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use datespot::config::settings::Settings;
use datespot::domain::services::activity_search_service::{ActivitySearchService, SearchOptions};
use datespot::domain::services::extraction_service::LlmActivityExtractor;
use datespot::domain::services::llm_service::{LLMServiceTrait, TokenUsage};
use datespot::engines::traits::{EngineError, PageRenderer};
use datespot::infrastructure::services::rate_limiting_service_impl::InMemoryRateLimiter;
use datespot::presentation::routes::{self, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

pub const SEARCH_PAGE: &str = r#"
<html>
  <head><script>window.__tracking = true;</script></head>
  <body>
    <div class="results">
      <div class="card"><a href="/lisbon-l42/picnic-t1/">Gourmet picnic in Monsanto</a><span>€45</span></div>
      <div class="card"><a href="/lisbon-l42/picnic-t2/">Sunset picnic by the river</a><span>€39</span></div>
    </div>
  </body>
</html>
"#;

/// 渲染器行为
#[allow(dead_code)]
pub enum PageBehavior {
    Html(&'static str),
    Timeout,
    Crash,
}

/// 不启动浏览器的渲染器
pub struct StubRenderer {
    behavior: PageBehavior,
    calls: AtomicUsize,
    last_url: std::sync::Mutex<Option<Url>>,
}

#[allow(dead_code)]
impl StubRenderer {
    pub fn new(behavior: PageBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_url: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<Url> {
        self.last_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, url: &Url) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.clone());
        match self.behavior {
            PageBehavior::Html(html) => Ok(html.to_string()),
            PageBehavior::Timeout => Err(EngineError::Timeout),
            PageBehavior::Crash => Err(EngineError::Browser("browser has disconnected".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 返回固定内容的 LLM
pub struct StaticLlm(pub Value);

#[async_trait]
impl LLMServiceTrait for StaticLlm {
    async fn extract_data(&self, _text: &str, _schema: &Value) -> anyhow::Result<(Value, TokenUsage)> {
        Ok((self.0.clone(), TokenUsage::default()))
    }
}

/// 生成 `count` 个活动的 LLM 回复
#[allow(dead_code)]
pub fn activities_reply(count: usize) -> Value {
    let activities: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("Picnic experience {}", i + 1),
                "url": format!("/lisbon-l42/picnic-t{}/", i + 1),
                "price": format!("€{}", 30 + i),
                "rating": 4.5
            })
        })
        .collect();
    json!({ "activities": activities })
}

#[allow(dead_code)]
pub fn test_settings() -> Settings {
    Settings::default()
}

/// 使用给定渲染器、LLM 与配置构建测试服务器
pub fn create_test_server(
    renderer: Arc<StubRenderer>,
    llm: Arc<dyn LLMServiceTrait>,
    settings: Settings,
) -> TestServer {
    let limiter = InMemoryRateLimiter::new(settings.rate_limiting.limit_config());
    let extractor = Arc::new(LlmActivityExtractor::new(
        llm,
        settings.scraper.max_html_chars,
    ));
    let search = Arc::new(ActivitySearchService::new(
        renderer,
        extractor,
        SearchOptions::from(&settings.scraper),
    ));

    let app = routes::routes(AppState {
        limiter: Arc::new(limiter),
        search,
        settings: Arc::new(settings),
    });

    TestServer::new(app).expect("Failed to create test server")
}
