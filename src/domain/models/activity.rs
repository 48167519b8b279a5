// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use url::Url;

/// 单次抓取最多返回的活动数量
pub const MAX_ACTIVITIES: usize = 5;

/// 活动查询
///
/// 由 slug/city 组合或搜索链接中的 `q` 参数解析而来
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// 活动名称，例如 "picnic"
    pub activity: String,
    /// 城市，例如 "Lisbon"
    pub location: String,
}

impl ActivityQuery {
    pub fn new(activity: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            location: location.into(),
        }
    }

    /// 搜索关键词（活动 + 空格 + 城市）
    pub fn search_terms(&self) -> String {
        format!("{} {}", self.activity, self.location)
    }
}

/// 活动条目
///
/// `title` 与 `url` 必填，其余字段缺失时不会出现在 JSON 中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Activity {
    /// 导航超时时使用的占位条目，链接指回合作方搜索页
    pub fn search_fallback(query: &ActivityQuery, search_url: &Url) -> Self {
        Self {
            title: format!("{} in {}", query.activity, query.location),
            url: search_url.to_string(),
            image: None,
            price: None,
            rating: None,
            description: Some("View live availability on the partner site".to_string()),
        }
    }
}

/// 抓取结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOutcome {
    /// 合作方搜索页链接，始终可用于“在合作方网站查看”
    pub search_url: Url,
    /// 提取到的活动，长度不超过 [`MAX_ACTIVITIES`]
    pub activities: Vec<Activity>,
}

impl ScrapeOutcome {
    pub fn empty(search_url: Url) -> Self {
        Self {
            search_url,
            activities: Vec::new(),
        }
    }
}
