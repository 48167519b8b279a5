// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::application::dto::scrape_request::QueryError;

/// 应用错误类型
///
/// - 400 / 429：`{"error": ...}`
/// - 500：`{"success": false, "error": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// 请求参数错误
    #[error("{0}")]
    BadRequest(String),
    /// 超出速率限制
    #[error("Too many requests. Please try again later.")]
    TooManyRequests { retry_after: Duration },
    /// 内部错误
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();

        match self {
            ApiError::TooManyRequests { retry_after } => {
                // Round up so clients never retry inside the window
                let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                let mut response =
                    (status, Json(json!({ "error": error_message }))).into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(seconds.max(1)),
                );
                response
            }
            ApiError::BadRequest(_) => {
                (status, Json(json!({ "error": error_message }))).into_response()
            }
            ApiError::Internal(_) => (
                status,
                Json(json!({ "success": false, "error": error_message })),
            )
                .into_response(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
