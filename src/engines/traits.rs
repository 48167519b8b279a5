// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 页面在截止时间内没有完成加载
    #[error("Navigation timed out")]
    Timeout,
    /// 浏览器启动、连接或 CDP 调用失败
    #[error("Browser error: {0}")]
    Browser(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断是否为导航超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout)
    }
}

/// 页面渲染引擎特质
///
/// 打开目标页面，等待其渲染完成并返回最终的 HTML
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染页面并返回 HTML
    async fn render(&self, url: &Url) -> Result<String, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
