// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::activity::{Activity, ScrapeOutcome};

/// 活动抓取响应数据传输对象
///
/// 成功时总是携带 `searchUrl`，即使 `results` 为空
#[derive(Debug, Deserialize, Serialize)]
pub struct ScrapeResponseDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 抓取数据
    pub data: ScrapeDataDto,
}

/// 抓取数据
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeDataDto {
    /// 合作方搜索页链接
    pub search_url: String,
    /// 活动列表（至多 5 条）
    pub results: Vec<Activity>,
}

impl From<ScrapeOutcome> for ScrapeResponseDto {
    fn from(outcome: ScrapeOutcome) -> Self {
        Self {
            success: true,
            data: ScrapeDataDto {
                search_url: outcome.search_url.into(),
                results: outcome.activities,
            },
        }
    }
}
