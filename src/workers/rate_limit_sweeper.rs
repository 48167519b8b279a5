// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::infrastructure::services::rate_limiting_service_impl::InMemoryRateLimiter;

/// 限流条目清理工作器
///
/// 定期删除窗口已结束的客户端条目，使内存占用只取决于
/// 一个窗口内的活跃客户端数量
pub struct RateLimitSweeper {
    limiter: InMemoryRateLimiter,
    interval: Duration,
}

impl RateLimitSweeper {
    pub fn new(limiter: InMemoryRateLimiter, interval: Duration) -> Self {
        Self { limiter, interval }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(
            "Rate limit sweeper started, interval {}s",
            self.interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let removed = self.sweep_once();
            if removed > 0 {
                debug!(
                    "Evicted {} expired rate limit entries, {} still tracked",
                    removed,
                    self.limiter.tracked_clients()
                );
            }
        }
    }

    /// 执行一次清理
    pub fn sweep_once(&self) -> usize {
        self.limiter.sweep_expired(Instant::now())
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
