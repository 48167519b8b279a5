// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

use crate::domain::models::activity::ActivityQuery;

/// 解析相对链接时使用的占位基础地址
const PLACEHOLDER_BASE: &str = "http://localhost/";

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 构造合作方搜索链接
///
/// 以 `q=<活动> <城市>` 的表单编码追加到基础地址，空格编码为 `+`，
/// 例如 `https://www.getyourguide.com/s/?q=picnic+Lisbon`。
/// 基础地址中已有的 `q` 参数会被替换，其余参数保留。
pub fn build_search_url(base: &str, query: &ActivityQuery) -> Result<Url, ParseError> {
    let mut url = Url::parse(base)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "q")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("q", &query.search_terms());
    }

    Ok(url)
}

/// 从搜索链接的 `q` 参数中取出以 `+` 分隔的关键词
///
/// 使用未解码的原始参数值按 `+` 切分，再逐个做百分号解码；
/// 解码出的 `%2B` 同样视为分隔符，`%20` 保留在词内，空词被丢弃。
/// 支持绝对链接与 `/s/?q=a+b` 这类相对链接；无法解析时返回空列表。
pub fn search_terms_from_url(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(PLACEHOLDER_BASE).and_then(|base| base.join(raw)) {
                Ok(url) => url,
                Err(_) => return Vec::new(),
            }
        }
        Err(_) => return Vec::new(),
    };

    let Some(value) = parsed
        .query()
        .into_iter()
        .flat_map(|query| query.split('&'))
        .find_map(|pair| pair.strip_prefix("q="))
    else {
        return Vec::new();
    };

    // `+` may also arrive percent-encoded as `%2B`
    value
        .split('+')
        .filter_map(|token| urlencoding::decode(token).ok())
        .flat_map(|token| {
            token
                .split('+')
                .map(|part| part.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}
