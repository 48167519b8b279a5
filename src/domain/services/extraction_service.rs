// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::domain::models::activity::{Activity, MAX_ACTIVITIES};
use crate::domain::services::llm_service::LLMServiceTrait;
use crate::utils::url_utils::resolve_url;

/// 清理时整体丢弃的标签
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "svg", "template", "iframe", "link", "meta",
];

/// 清理时保留的属性，其余属性（class、style、data-*）全部丢弃
const KEPT_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title", "aria-label"];

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// 活动提取器
///
/// 从渲染后的搜索结果页中提取活动条目
#[async_trait]
pub trait ActivityExtractor: Send + Sync {
    /// 提取至多 `limit` 个活动，`page_url` 用于解析相对链接
    async fn extract(&self, html: &str, page_url: &Url, limit: usize) -> Result<Vec<Activity>>;
}

/// 基于 LLM 的活动提取器
///
/// 先精简 HTML，再按固定 JSON 模式调用 LLM，最后逐条校验结果
pub struct LlmActivityExtractor {
    llm: Arc<dyn LLMServiceTrait>,
    max_html_chars: usize,
}

impl LlmActivityExtractor {
    pub fn new(llm: Arc<dyn LLMServiceTrait>, max_html_chars: usize) -> Self {
        Self {
            llm,
            max_html_chars,
        }
    }
}

#[async_trait]
impl ActivityExtractor for LlmActivityExtractor {
    async fn extract(&self, html: &str, page_url: &Url, limit: usize) -> Result<Vec<Activity>> {
        let cleaned = clean_html(html, self.max_html_chars);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let schema = activity_schema(limit.min(MAX_ACTIVITIES));
        let (data, usage) = self.llm.extract_data(&cleaned, &schema).await?;
        debug!(
            "LLM extraction used {} tokens for {} chars of HTML",
            usage.total_tokens,
            cleaned.len()
        );

        Ok(parse_activities(&data, page_url, limit))
    }
}

/// 活动列表的 JSON 模式
pub fn activity_schema(limit: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "activities": {
                "type": "array",
                "maxItems": limit,
                "description": "Bookable activities listed in the search results, in page order",
                "items": {
                    "type": "object",
                    "required": ["title", "url"],
                    "properties": {
                        "title": { "type": "string" },
                        "url": { "type": "string", "description": "Link to the activity detail page" },
                        "image": { "type": "string", "description": "Main image URL" },
                        "price": { "type": "string", "description": "Price as displayed, including currency" },
                        "rating": { "type": "number", "description": "Average rating out of 5" },
                        "description": { "type": "string" }
                    }
                }
            }
        },
        "required": ["activities"]
    })
}

/// 精简 HTML
///
/// 丢弃脚本、样式、注释与无关属性，压缩空白，并按字符截断
pub fn clean_html(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 4);

    // html > head + body; only the body carries listings
    for child in document.root_element().children() {
        if let Some(element) = ElementRef::wrap(child) {
            write_element(element, &mut out);
        }
    }

    let collapsed = WHITESPACE.replace_all(&out, " ");
    truncate_chars(collapsed.trim(), max_chars).to_string()
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        if KEPT_ATTRIBUTES.contains(&attr) {
            let _ = write!(out, " {}=\"{}\"", attr, value.replace('"', "&quot;"));
        }
    }
    out.push('>');

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    write_element(child_element, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 校验 LLM 返回的活动列表
///
/// 缺少标题或链接的条目会被丢弃，相对链接按 `page_url` 解析，
/// 重复链接只保留第一条，结果最多 `limit` 条（且不超过 5 条）
pub fn parse_activities(data: &Value, page_url: &Url, limit: usize) -> Vec<Activity> {
    let items = match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("activities") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let cap = limit.min(MAX_ACTIVITIES);
    let mut activities: Vec<Activity> = Vec::with_capacity(cap);

    for item in items {
        if activities.len() >= cap {
            break;
        }

        let Some(activity) = parse_activity(item, page_url) else {
            continue;
        };
        if activities.iter().any(|a| a.url == activity.url) {
            continue;
        }
        activities.push(activity);
    }

    activities
}

fn parse_activity(item: &Value, page_url: &Url) -> Option<Activity> {
    let title = non_blank(item.get("title"))?;
    let url = web_url(page_url, &non_blank(item.get("url"))?)?;

    Some(Activity {
        title,
        url,
        image: non_blank(item.get("image")).and_then(|src| web_url(page_url, &src)),
        price: price_text(item.get("price")),
        rating: rating_value(item.get("rating")),
        description: non_blank(item.get("description")),
    })
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn web_url(page_url: &Url, raw: &str) -> Option<String> {
    let resolved = resolve_url(page_url, raw).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn price_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        other => non_blank(Some(other)),
    }
}

fn rating_value(value: Option<&Value>) -> Option<f32> {
    let rating = match value? {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => {
            // "4.7", "4.7/5", "4.7 (1,203 reviews)"
            let numeric: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            numeric.parse::<f32>().ok()?
        }
        _ => return None,
    };
    (rating.is_finite() && rating >= 0.0).then_some(rating)
}
