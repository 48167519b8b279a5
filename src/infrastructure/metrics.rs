// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 未启用时不安装记录器，`counter!` 等调用退化为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics address {}: {}. Metrics disabled.",
                settings.listen_addr, e
            );
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_counter!(
        "scrape_requests_total",
        "Scrape requests by outcome (ok, empty, invalid, error)"
    );
    describe_counter!(
        "scrape_fallbacks_total",
        "Scrapes degraded to a fallback result, by reason"
    );
    describe_counter!(
        "rate_limit_rejections_total",
        "Requests rejected by the per-IP rate limiter"
    );
    describe_histogram!(
        "scrape_duration_seconds",
        "Time spent rendering and extracting a search page"
    );

    info!("Metrics exporter listening on {}", addr);
}
