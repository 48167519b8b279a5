// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::settings::LlmSettings;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMServiceTrait: Send + Sync {
    async fn extract_data(&self, text: &str, schema: &Value) -> Result<(Value, TokenUsage)>;
}

/// LLM服务 - 处理与LLM提供商的交互
///
/// # 功能
///
/// 通过 OpenAI 兼容的 `/chat/completions` 接口，按给定 JSON 模式从文本中提取结构化数据
///
/// # 配置
///
/// 见 [`LlmSettings`]：API 密钥、模型名称、API 基础地址与超时时间
pub struct LLMService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

#[async_trait]
impl LLMServiceTrait for LLMService {
    async fn extract_data(&self, text: &str, schema: &Value) -> Result<(Value, TokenUsage)> {
        LLMService::extract_data(self, text, schema).await
    }
}

impl LLMService {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// 使用LLM从文本中提取结构化数据
    ///
    /// # 参数
    /// * `text` - 输入文本（例如清理后的HTML）
    /// * `schema` - JSON模式，描述期望的输出结构
    ///
    /// # 返回值
    /// * `Result<(Value, TokenUsage)>` - 提取的数据和令牌使用情况
    ///
    /// # 错误
    /// * 当LLM API密钥未配置时返回错误
    /// * 当LLM服务调用失败或返回内容不是合法JSON时返回错误
    pub async fn extract_data(&self, text: &str, schema: &Value) -> Result<(Value, TokenUsage)> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("LLM API key not configured"))?;

        let prompt = format!(
            "Extract data from the following content according to this JSON schema: {}. \
            Return ONLY the valid JSON object, no markdown formatting. \
            Content: {}",
            schema, text
        );

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful data extraction assistant. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.0,
            "response_format": { "type": "json_object" }
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        let usage = if let Some(usage_val) = body.get("usage") {
            TokenUsage {
                prompt_tokens: usage_val["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_val["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_val["total_tokens"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            TokenUsage::default()
        };

        if let Some(content) = body["choices"][0]["message"]["content"].as_str() {
            let data = serde_json::from_str::<Value>(strip_code_fence(content))
                .context("Failed to parse extracted JSON content")?;
            Ok((data, usage))
        } else {
            Err(anyhow::anyhow!("Invalid response format from LLM API"))
        }
    }
}

// Models sometimes wrap JSON in markdown fences despite the instructions
fn strip_code_fence(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
