//! `/status/:code`: respond with an arbitrary status.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::error::{AppError, AppResult};
use crate::http::params::parse_number;
use crate::http::request::RouteRequest;
use crate::http::server::AppState;

/// Inclusive range of codes the route will emit.
pub const STATUS_RANGE: std::ops::RangeInclusive<u16> = 200..=599;

pub async fn status(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let raw = req
        .route
        .arg(0)
        .ok_or_else(|| AppError::bad_request("Status code is required"))?;
    let code: i64 = parse_number(raw)?;

    let status = u16::try_from(code)
        .ok()
        .filter(|c| STATUS_RANGE.contains(c))
        .and_then(|c| StatusCode::from_u16(c).ok())
        .ok_or_else(|| {
            AppError::bad_request(format!("Invalid status code: {code}, expected 200-599"))
        })?;

    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Ok((status, Body::empty()).into_response());
    }
    Ok((status, Json(json!({ "code": status.as_u16() }))).into_response())
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::get;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_every_code_in_range_is_returned_verbatim() {
        for code in [200u16, 201, 202, 299, 301, 400, 404, 418, 451, 500, 503, 599] {
            let response = get(&format!("/status/{code}")).await;
            assert_eq!(response.status.as_u16(), code);
            assert_eq!(response.json(), json!({ "code": code }));
        }
    }

    #[tokio::test]
    async fn test_empty_body_statuses() {
        for code in [204u16, 304] {
            let response = get(&format!("/status/{code}")).await;
            assert_eq!(response.status.as_u16(), code);
            assert!(response.body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_codes_are_declared_400() {
        for path in ["/status", "/status/", "/status/abc", "/status/199", "/status/600", "/status/-1", "/status/70000"] {
            let response = get(path).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(response.json()["code"], json!(400));
        }
    }
}
