// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 活动检索服务：构造搜索链接、渲染页面、提取活动并处理降级
pub mod activity_search_service;
/// 活动提取服务：清理 HTML 并调用 LLM 按固定结构提取
pub mod extraction_service;
/// LLM 服务：OpenAI 兼容的结构化提取接口
pub mod llm_service;
/// 限流服务接口
pub mod rate_limiting_service;
