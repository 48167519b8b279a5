// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::services::rate_limiting_service::{
    RateLimitConfig, RateLimitDecision, RateLimitingService,
};

/// 单个客户端的窗口计数
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    /// 当前窗口内的请求数
    pub count: u32,
    /// 窗口重置时间
    pub reset_at: Instant,
}

/// 进程内固定窗口限流器
///
/// 计数只保存在当前进程中，多实例部署时不共享。
/// 过期条目由 [`InMemoryRateLimiter::sweep_expired`] 清理，
/// 参见 `workers::rate_limit_sweeper`。
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    config: RateLimitConfig,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// 在给定时间点记录一次请求
    ///
    /// - 新客户端：计数为 1，窗口从 `now` 开始
    /// - `now` 已超过重置时间：窗口重新开始，计数为 1
    /// - 计数低于上限：计数加 1 并放行
    /// - 否则拒绝，计数保持不变
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let max = self.config.max_requests;
        let window = self.config.window;

        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry {
                    count: 1,
                    reset_at: now + window,
                });
                RateLimitDecision::Allowed {
                    remaining: max.saturating_sub(1),
                }
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.reset_at {
                    entry.count = 1;
                    entry.reset_at = now + window;
                    RateLimitDecision::Allowed {
                        remaining: max.saturating_sub(1),
                    }
                } else if entry.count < max {
                    entry.count += 1;
                    RateLimitDecision::Allowed {
                        remaining: max - entry.count,
                    }
                } else {
                    RateLimitDecision::Limited {
                        retry_after: entry.reset_at.saturating_duration_since(now),
                    }
                }
            }
        }
    }

    /// 删除窗口已经结束的条目，返回删除数量
    ///
    /// 被删除的客户端下次请求时与窗口过期的行为一致
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.reset_at);
        before.saturating_sub(self.entries.len())
    }

    /// 当前跟踪的客户端数量
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimitingService for InMemoryRateLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }
}
