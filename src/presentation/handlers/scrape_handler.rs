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

use axum::extract::{rejection::JsonRejection, Extension, Json};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    application::dto::{scrape_request::ScrapeRequestDto, scrape_response::ScrapeResponseDto},
    domain::services::activity_search_service::ActivitySearch,
    presentation::errors::ApiError,
};

/// 实时活动检索
///
/// `POST /api/scrape`，请求体为 `{slug?, city?, url?}`：
/// - 无法解析出活动与城市：400
/// - 抓取完成（即使没有结果）：200，`data.searchUrl` 总是存在
/// - 意外错误：500，`{"success": false, "error": ...}`
pub async fn scrape_activities(
    Extension(search): Extension<Arc<dyn ActivitySearch>>,
    payload: Result<Json<ScrapeRequestDto>, JsonRejection>,
) -> Result<Json<ScrapeResponseDto>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        counter!("scrape_requests_total", "outcome" => "invalid").increment(1);
        warn!("Rejected malformed scrape request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    info!(
        slug = ?payload.slug,
        city = ?payload.city,
        url = ?payload.url,
        "Scrape request received"
    );

    let query = payload.resolve().map_err(|e| {
        counter!("scrape_requests_total", "outcome" => "invalid").increment(1);
        warn!("Rejected scrape request: {}", e);
        ApiError::from(e)
    })?;

    match search.scrape(&query).await {
        Ok(outcome) => {
            let label = if outcome.activities.is_empty() { "empty" } else { "ok" };
            counter!("scrape_requests_total", "outcome" => label).increment(1);
            info!(
                "Returning {} activities for {} ({})",
                outcome.activities.len(),
                query.search_terms(),
                outcome.search_url
            );
            Ok(Json(ScrapeResponseDto::from(outcome)))
        }
        Err(e) => {
            counter!("scrape_requests_total", "outcome" => "error").increment(1);
            error!("Scrape failed for {}: {:#}", query.search_terms(), e);
            Err(ApiError::from(e))
        }
    }
}
