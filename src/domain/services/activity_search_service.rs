// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::settings::ScraperSettings;
use crate::domain::models::activity::{Activity, ActivityQuery, ScrapeOutcome, MAX_ACTIVITIES};
use crate::domain::services::extraction_service::ActivityExtractor;
use crate::engines::traits::{EngineError, PageRenderer};
use crate::utils::url_utils::build_search_url;
use url::Url;

/// 活动检索接口
///
/// 抓取失败不会以错误形式返回，而是降级为空列表或占位条目；
/// 只有无法构造搜索链接时才返回错误
#[async_trait]
pub trait ActivitySearch: Send + Sync {
    async fn scrape(&self, query: &ActivityQuery) -> Result<ScrapeOutcome>;
}

/// 检索参数
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// 合作方搜索页地址
    pub search_base_url: String,
    /// 最多返回的活动数量
    pub max_results: usize,
    /// 导航超时时是否返回占位活动
    pub synthesize_on_timeout: bool,
}

impl From<&ScraperSettings> for SearchOptions {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            search_base_url: settings.search_base_url.clone(),
            max_results: settings.max_results,
            synthesize_on_timeout: settings.synthesize_on_timeout,
        }
    }
}

/// 活动检索服务
///
/// 渲染合作方搜索页并提取活动：
/// - 导航超时：返回一个指向搜索页的占位活动
/// - 其他渲染或提取失败：返回空列表
/// - 不重试，不缓存
pub struct ActivitySearchService<R, E>
where
    R: PageRenderer + ?Sized,
    E: ActivityExtractor + ?Sized,
{
    renderer: Arc<R>,
    extractor: Arc<E>,
    options: SearchOptions,
}

impl<R, E> ActivitySearchService<R, E>
where
    R: PageRenderer + ?Sized,
    E: ActivityExtractor + ?Sized,
{
    pub fn new(renderer: Arc<R>, extractor: Arc<E>, options: SearchOptions) -> Self {
        Self {
            renderer,
            extractor,
            options,
        }
    }

    fn limit(&self) -> usize {
        self.options.max_results.min(MAX_ACTIVITIES)
    }
}

/// 一次抓取的结局，用作指标标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Extracted,
    Timeout,
    RenderFailed,
    ExtractFailed,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Extracted => "extracted",
            ScrapeStatus::Timeout => "timeout",
            ScrapeStatus::RenderFailed => "render",
            ScrapeStatus::ExtractFailed => "extract",
        }
    }
}

impl<R, E> ActivitySearchService<R, E>
where
    R: PageRenderer + ?Sized,
    E: ActivityExtractor + ?Sized,
{
    /// 渲染并提取；任何失败都降级为占位条目或空列表
    async fn collect(&self, query: &ActivityQuery, search_url: &Url) -> (Vec<Activity>, ScrapeStatus) {
        let html = match self.renderer.render(search_url).await {
            Ok(html) => html,
            Err(EngineError::Timeout) => {
                if !self.options.synthesize_on_timeout {
                    warn!("Navigation to {} timed out, returning no activities", search_url);
                    return (Vec::new(), ScrapeStatus::Timeout);
                }
                warn!(
                    "Navigation to {} timed out, returning search page placeholder",
                    search_url
                );
                let fallback = Activity::search_fallback(query, search_url);
                return (vec![fallback], ScrapeStatus::Timeout);
            }
            Err(e) => {
                error!("Failed to render {}: {}", search_url, e);
                return (Vec::new(), ScrapeStatus::RenderFailed);
            }
        };

        let limit = self.limit();
        match self.extractor.extract(&html, search_url, limit).await {
            Ok(mut activities) => {
                activities.truncate(limit);
                (activities, ScrapeStatus::Extracted)
            }
            Err(e) => {
                error!("Failed to extract activities from {}: {:#}", search_url, e);
                (Vec::new(), ScrapeStatus::ExtractFailed)
            }
        }
    }
}

#[async_trait]
impl<R, E> ActivitySearch for ActivitySearchService<R, E>
where
    R: PageRenderer + ?Sized,
    E: ActivityExtractor + ?Sized,
{
    async fn scrape(&self, query: &ActivityQuery) -> Result<ScrapeOutcome> {
        let search_url = build_search_url(&self.options.search_base_url, query).with_context(
            || format!("Invalid search base URL: {}", self.options.search_base_url),
        )?;

        let start = Instant::now();
        info!(
            activity = %query.activity,
            location = %query.location,
            engine = self.renderer.name(),
            "Scraping {}",
            search_url
        );

        let (activities, status) = self.collect(query, &search_url).await;

        histogram!("scrape_duration_seconds", "status" => status.as_str())
            .record(start.elapsed().as_secs_f64());
        if status != ScrapeStatus::Extracted {
            counter!("scrape_fallbacks_total", "reason" => status.as_str()).increment(1);
        }
        info!(
            "Scrape of {} finished as {} with {} activities in {}ms",
            query.search_terms(),
            status.as_str(),
            activities.len(),
            start.elapsed().as_millis()
        );

        Ok(ScrapeOutcome {
            search_url,
            activities,
        })
    }
}
