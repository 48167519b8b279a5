// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::engines::traits::{EngineError, PageRenderer};
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// 浏览器引擎参数
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// 远程 Chrome 调试地址，未设置时在本地启动 Chromium
    pub remote_debugging_url: Option<String>,
    /// 导航截止时间
    pub navigation_timeout: Duration,
    /// 页面加载后额外等待的时间，用于近似网络空闲
    pub network_idle: Duration,
    /// 同时打开的页面上限
    pub max_concurrent_pages: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            navigation_timeout: Duration::from_secs(30),
            network_idle: Duration::from_millis(1500),
            max_concurrent_pages: 8,
        }
    }
}

impl From<&ScraperSettings> for BrowserOptions {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            remote_debugging_url: settings.remote_debugging_url.clone(),
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
            network_idle: Duration::from_millis(settings.network_idle_ms),
            max_concurrent_pages: settings.max_concurrent_pages.max(1),
        }
    }
}

/// Playwright引擎
///
/// 基于chromiumoxide实现的浏览器渲染引擎。
/// 浏览器实例在第一次渲染时启动，之后由所有请求共享；
/// 每次渲染打开并关闭一个独立页面，页面数量受信号量限制。
pub struct PlaywrightEngine {
    // Shared browser, launched lazily and kept until `shutdown`.
    browser: Mutex<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    pages: Arc<Semaphore>,
    options: BrowserOptions,
}

impl PlaywrightEngine {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            browser: Mutex::new(None),
            handler_task: Mutex::new(None),
            pages: Arc::new(Semaphore::new(options.max_concurrent_pages)),
            options,
        }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// 当前可用的页面许可数
    pub fn available_pages(&self) -> usize {
        self.pages.available_permits()
    }

    async fn launch(&self) -> Result<Browser, EngineError> {
        let (browser, mut handler) = if let Some(ref url) = self.options.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str())
                .await
                .map_err(|e| EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            info!("Launching shared headless Chromium");
            let config = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(self.options.navigation_timeout)
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .build()
                .map_err(EngineError::Browser)?;

            Browser::launch(config)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
        };

        // Drive CDP events for the lifetime of the browser
        let task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("Browser handler loop finished");
        });

        if let Some(previous) = self.handler_task.lock().await.replace(task) {
            previous.abort();
        }

        Ok(browser)
    }

    async fn open_page(&self) -> Result<Page, EngineError> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }

        let browser = guard
            .as_ref()
            .ok_or_else(|| EngineError::Browser("browser unavailable".to_string()))?;

        match browser.new_page("about:blank").await {
            Ok(page) => Ok(page),
            Err(e) => {
                // Drop a dead browser so the next request relaunches it
                warn!("Failed to open page, discarding shared browser: {}", e);
                guard.take();
                Err(from_cdp(e))
            }
        }
    }

    async fn load(page: &Page, url: &Url, network_idle: Duration) -> Result<String, EngineError> {
        // goto waits for the load event
        page.goto(url.as_str()).await.map_err(from_cdp)?;

        if !network_idle.is_zero() {
            tokio::time::sleep(network_idle).await;
        }

        page.content().await.map_err(from_cdp)
    }

    /// 关闭共享浏览器
    ///
    /// 可以重复调用；之后的渲染会重新启动浏览器
    pub async fn shutdown(&self) {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            info!("Closing shared browser");
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
    }
}

/// 将 CDP 错误映射为引擎错误，CDP 请求超时同样视为导航超时
fn from_cdp(err: CdpError) -> EngineError {
    match err {
        CdpError::Timeout => EngineError::Timeout,
        other => EngineError::Browser(other.to_string()),
    }
}

impl Default for PlaywrightEngine {
    fn default() -> Self {
        Self::new(BrowserOptions::default())
    }
}

#[async_trait]
impl PageRenderer for PlaywrightEngine {
    async fn render(&self, url: &Url) -> Result<String, EngineError> {
        let _permit = self
            .pages
            .acquire()
            .await
            .map_err(|_| EngineError::Other("page pool closed".to_string()))?;

        // Opening the page and loading it share one deadline
        let start = Instant::now();
        let deadline = start + self.options.navigation_timeout;
        let page = timeout_at(deadline, self.open_page())
            .await
            .map_err(|_| EngineError::Timeout)??;

        let loaded = timeout_at(deadline, Self::load(&page, url, self.options.network_idle)).await;

        // The browser is kept for reuse; only the page is closed.
        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        match loaded {
            Ok(Ok(content)) => {
                debug!(
                    "Rendered {} ({} bytes) in {}ms",
                    url,
                    content.len(),
                    start.elapsed().as_millis()
                );
                Ok(content)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EngineError::Timeout),
        }
    }

    fn name(&self) -> &'static str {
        "playwright"
    }
}
