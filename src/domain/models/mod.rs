// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 所有模型都是请求级别的临时数据，不做持久化：
/// - 活动查询（ActivityQuery）：活动名称与城市
/// - 活动条目（Activity）：从合作方搜索页提取的单条结果
/// - 抓取结果（ScrapeOutcome）：搜索链接与活动列表
pub mod activity;
