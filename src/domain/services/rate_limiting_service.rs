// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 固定窗口限流配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 每个窗口允许的最大请求数
    pub max_requests: u32,
    /// 窗口长度
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

/// 限流结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// 允许通过（当前窗口剩余次数）
    Allowed { remaining: u32 },
    /// 被拒绝，窗口将在 `retry_after` 后重置
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// 限流服务接口
///
/// 以客户端标识（通常是 IP）为键的准入控制
pub trait RateLimitingService: Send + Sync {
    /// 记录一次请求并返回限流结果
    fn check(&self, key: &str) -> RateLimitDecision;

    /// 布尔形式的限流检查，`false` 表示应返回 429
    fn check_rate_limit(&self, key: &str) -> bool {
        self.check(key).is_allowed()
    }
}
