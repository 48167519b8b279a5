// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::services::activity_search_service::ActivitySearch;
use crate::domain::services::rate_limiting_service::RateLimitingService;
use crate::presentation::handlers::scrape_handler;
use crate::presentation::middleware::rate_limit_middleware::{
    rate_limit_middleware, RateLimitState,
};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    /// 限流服务
    pub limiter: Arc<dyn RateLimitingService>,
    /// 活动检索服务
    pub search: Arc<dyn ActivitySearch>,
    /// 应用配置
    pub settings: Arc<Settings>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/version", get(version));

    let mut scrape_routes =
        Router::new().route("/api/scrape", post(scrape_handler::scrape_activities));

    if state.settings.rate_limiting.enabled {
        let rate_limit_state = RateLimitState {
            limiter: state.limiter.clone(),
            fallback_client_key: state.settings.rate_limiting.fallback_client_key.clone(),
        };
        scrape_routes = scrape_routes.route_layer(axum::middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ));
    }

    Router::new()
        .merge(public_routes)
        .merge(scrape_routes)
        .layer(Extension(state.search))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
