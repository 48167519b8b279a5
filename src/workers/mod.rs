// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 后台工作器模块
///
/// 目前只有限流条目清理工作器
pub mod rate_limit_sweeper;
