// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域接口的具体实现与外部系统集成：
/// - 指标（metrics）：Prometheus 导出器
/// - 服务实现（services）：进程内限流器
pub mod metrics;
pub mod services;
