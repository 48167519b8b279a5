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
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use std::sync::Arc;
use tracing::warn;

use crate::domain::services::rate_limiting_service::{RateLimitDecision, RateLimitingService};
use crate::presentation::errors::ApiError;
use crate::presentation::extractors::client_ip::ClientIp;

/// 速率限制中间件状态
#[derive(Clone)]
pub struct RateLimitState {
    /// 限流服务
    pub limiter: Arc<dyn RateLimitingService>,
    /// 缺少 x-forwarded-for 时共用的客户端标识
    pub fallback_client_key: String,
}

/// 速率限制中间件
///
/// 按客户端 IP 应用固定窗口限流，超限时返回 429 与 `Retry-After`
///
/// # 参数
///
/// * `state` - 限流状态
/// * `client_ip` - 客户端 IP
/// * `request` - HTTP请求
/// * `next` - 下一个中间件
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    client_ip: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip.key_or(&state.fallback_client_key);

    if let RateLimitDecision::Limited { retry_after } = state.limiter.check(key) {
        counter!("rate_limit_rejections_total").increment(1);
        warn!(
            "Rate limit exceeded for client {}, retry after {}s",
            key,
            retry_after.as_secs()
        );
        return Err(ApiError::TooManyRequests { retry_after });
    }

    Ok(next.run(request).await)
}
