// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求数据传输对象及其解析
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含活动模型、限流接口、LLM 提取与活动检索服务
pub mod domain;

/// 引擎模块
///
/// 基于无头浏览器的页面渲染引擎
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出与进程内限流实现
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 工具模块
///
/// 提供日志初始化与搜索链接处理
pub mod utils;

/// 工作器模块
///
/// 后台维护任务
pub mod workers;
