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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::services::rate_limiting_service::RateLimitConfig;

/// 应用程序配置设置
///
/// 包含服务器、速率限制、抓取器、LLM 和指标等所有配置项
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 速率限制配置
    pub rate_limiting: RateLimitingSettings,
    /// 抓取器配置
    pub scraper: ScraperSettings,
    /// LLM 配置
    pub llm: LlmSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 速率限制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitingSettings {
    /// 是否启用速率限制
    pub enabled: bool,
    /// 每个窗口的请求上限
    pub max_requests: u32,
    /// 窗口长度（秒）
    pub window_secs: u64,
    /// 过期条目清理间隔（秒），0 表示不清理
    pub sweep_interval_secs: u64,
    /// 缺少 x-forwarded-for 时使用的客户端标识
    pub fallback_client_key: String,
}

impl Default for RateLimitingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_secs: 60,
            sweep_interval_secs: 300,
            fallback_client_key: "unknown".to_string(),
        }
    }
}

impl RateLimitingSettings {
    pub fn limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.max_requests,
            window: Duration::from_secs(self.window_secs),
        }
    }
}

/// 抓取器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 合作方搜索页地址
    pub search_base_url: String,
    /// 导航超时时间（秒）
    pub navigation_timeout_secs: u64,
    /// 页面加载后的等待时间（毫秒）
    pub network_idle_ms: u64,
    /// 最多返回的活动数量（不超过 5）
    pub max_results: usize,
    /// 共享浏览器上同时打开的页面上限
    pub max_concurrent_pages: usize,
    /// 发送给 LLM 的 HTML 最大字符数
    pub max_html_chars: usize,
    /// 导航超时时是否返回指向搜索页的占位活动
    pub synthesize_on_timeout: bool,
    /// 远程 Chrome 调试地址
    pub remote_debugging_url: Option<String>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            search_base_url: "https://www.getyourguide.com/s/".to_string(),
            navigation_timeout_secs: 30,
            network_idle_ms: 1500,
            max_results: 5,
            max_concurrent_pages: 8,
            max_html_chars: 60_000,
            synthesize_on_timeout: true,
            remote_debugging_url: None,
        }
    }
}

/// LLM配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// API 密钥，未设置时读取 `LLM_API_KEY`
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// OpenAI 兼容的 API 基础地址
    pub api_base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 45,
        }
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "0.0.0.0:9000".to_string(),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `DATESPOT__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DATESPOT").separator("__"));

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        if settings.llm.api_key.is_none() {
            settings.llm.api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(settings)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let server = ServerSettings::default();
        let rate = RateLimitingSettings::default();
        let scraper = ScraperSettings::default();
        let llm = LlmSettings::default();
        let metrics = MetricsSettings::default();

        builder
            // Server
            .set_default("server.host", server.host)?
            .set_default("server.port", server.port)?
            // Rate limiting
            .set_default("rate_limiting.enabled", rate.enabled)?
            .set_default("rate_limiting.max_requests", rate.max_requests)?
            .set_default("rate_limiting.window_secs", rate.window_secs)?
            .set_default("rate_limiting.sweep_interval_secs", rate.sweep_interval_secs)?
            .set_default("rate_limiting.fallback_client_key", rate.fallback_client_key)?
            // Scraper
            .set_default("scraper.search_base_url", scraper.search_base_url)?
            .set_default("scraper.navigation_timeout_secs", scraper.navigation_timeout_secs)?
            .set_default("scraper.network_idle_ms", scraper.network_idle_ms)?
            .set_default("scraper.max_results", scraper.max_results as u64)?
            .set_default("scraper.max_concurrent_pages", scraper.max_concurrent_pages as u64)?
            .set_default("scraper.max_html_chars", scraper.max_html_chars as u64)?
            .set_default("scraper.synthesize_on_timeout", scraper.synthesize_on_timeout)?
            // LLM
            .set_default("llm.model", llm.model)?
            .set_default("llm.api_base_url", llm.api_base_url)?
            .set_default("llm.timeout_secs", llm.timeout_secs)?
            // Metrics
            .set_default("metrics.enabled", metrics.enabled)?
            .set_default("metrics.listen_addr", metrics.listen_addr)
    }
}
