// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：活动查询与活动条目
/// - 服务（services）：限流、LLM 提取与活动检索
///
/// 领域层不依赖于 HTTP 层，浏览器引擎通过 trait 注入。
pub mod models;
pub mod services;
