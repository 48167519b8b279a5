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

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::domain::models::activity::ActivityQuery;
use crate::utils::url_utils::search_terms_from_url;

/// 查询解析错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// 既没有 slug/city，也无法从链接中解析出活动和城市
    #[error("Missing activity or location")]
    MissingActivityOrLocation,
    /// 字段校验失败
    #[error("Invalid request: {0}")]
    Invalid(String),
}

/// 活动抓取请求数据传输对象
///
/// 二选一：
/// - `slug` + `city`，例如 `{"slug": "sunset-picnic", "city": "Lisbon"}`
/// - `url`，其 `q` 参数形如 `活动+城市`
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct ScrapeRequestDto {
    /// 日期创意的 slug，连字符会被替换为空格
    #[validate(length(max = 200))]
    pub slug: Option<String>,
    /// 城市名称
    #[validate(length(max = 200))]
    pub city: Option<String>,
    /// 合作方搜索链接
    #[validate(length(max = 2048))]
    pub url: Option<String>,
}

impl ScrapeRequestDto {
    /// 解析出活动查询
    ///
    /// slug/city 优先；否则取链接 `q` 参数按 `+` 切分后的前两个词
    pub fn resolve(&self) -> Result<ActivityQuery, QueryError> {
        self.validate()
            .map_err(|e| QueryError::Invalid(e.to_string()))?;

        if let (Some(slug), Some(city)) = (non_blank(&self.slug), non_blank(&self.city)) {
            let activity = slug_to_activity(slug);
            if !activity.is_empty() {
                return Ok(ActivityQuery::new(activity, city));
            }
        }

        if let Some(url) = non_blank(&self.url) {
            if let [activity, location, ..] = search_terms_from_url(url).as_slice() {
                return Ok(ActivityQuery::new(activity.clone(), location.clone()));
            }
        }

        Err(QueryError::MissingActivityOrLocation)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn slug_to_activity(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
