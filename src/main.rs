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

use datespot::config::settings::Settings;
use datespot::domain::services::activity_search_service::{ActivitySearchService, SearchOptions};
use datespot::domain::services::extraction_service::LlmActivityExtractor;
use datespot::domain::services::llm_service::LLMService;
use datespot::engines::playwright_engine::{BrowserOptions, PlaywrightEngine};
use datespot::infrastructure::services::rate_limiting_service_impl::InMemoryRateLimiter;
use datespot::presentation::routes::{self, AppState};
use datespot::workers::rate_limit_sweeper::RateLimitSweeper;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use datespot::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting datespot...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    datespot::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Rate limiter and its sweeper
    let limiter = InMemoryRateLimiter::new(settings.rate_limiting.limit_config());
    if settings.rate_limiting.enabled && settings.rate_limiting.sweep_interval_secs > 0 {
        RateLimitSweeper::new(
            limiter.clone(),
            Duration::from_secs(settings.rate_limiting.sweep_interval_secs),
        )
        .start();
    }
    info!(
        "Rate limiter initialized: {} requests per {}s",
        settings.rate_limiting.max_requests, settings.rate_limiting.window_secs
    );

    // 4. Scraper: shared browser + LLM extraction
    let llm = Arc::new(LLMService::new(&settings.llm)?);
    if !llm.is_configured() {
        warn!("LLM API key not configured, scrapes will return empty results");
    }
    let extractor = Arc::new(LlmActivityExtractor::new(
        llm,
        settings.scraper.max_html_chars,
    ));
    let browser = Arc::new(PlaywrightEngine::new(BrowserOptions::from(
        &settings.scraper,
    )));
    let search = Arc::new(ActivitySearchService::new(
        browser.clone(),
        extractor,
        SearchOptions::from(&settings.scraper),
    ));

    // 5. Start HTTP server
    let app = routes::routes(AppState {
        limiter: Arc::new(limiter),
        search,
        settings: settings.clone(),
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 6. Release the shared browser
    browser.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
