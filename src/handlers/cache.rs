//! `/cache` and `/cache/:seconds`.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::handlers::dynamic::http_date;
use crate::handlers::inspect::describe_request;
use crate::http::error::{AppError, AppResult};
use crate::http::params::parse_number;
use crate::http::request::RouteRequest;
use crate::http::server::AppState;

pub const MAX_CACHE_SECS: i64 = 3600;

pub async fn cache(_state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    match req.route.arg(0).map(str::to_string) {
        None => conditional(&mut req).await,
        Some(raw) => cacheable(&mut req, &raw).await,
    }
}

/// 304 when the client sends a validator, otherwise the request echo.
async fn conditional(req: &mut RouteRequest) -> AppResult<Response> {
    let headers = req.headers();
    if headers.contains_key(header::IF_NONE_MATCH) || headers.contains_key(header::IF_MODIFIED_SINCE) {
        return Ok((StatusCode::NOT_MODIFIED, Body::empty()).into_response());
    }
    Ok(Json(describe_request(req).await?).into_response())
}

async fn cacheable(req: &mut RouteRequest, raw: &str) -> AppResult<Response> {
    let seconds: i64 = parse_number(raw)?;
    if seconds <= 0 {
        return Err(AppError::bad_request(format!(
            "Cache seconds must be positive, got {seconds}"
        )));
    }
    let seconds = seconds.min(MAX_CACHE_SECS);

    let now = Utc::now();
    let expires = now + chrono::Duration::seconds(seconds);
    let etag = format!("\"{}\"", uuid::Uuid::new_v4().simple());

    let mut response = Json(describe_request(req).await?).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("public, max-age={seconds}"))
            .map_err(axum::http::Error::from)?,
    );
    headers.insert(
        header::EXPIRES,
        HeaderValue::from_str(&http_date(expires)).map_err(axum::http::Error::from)?,
    );
    headers.insert(
        header::LAST_MODIFIED,
        HeaderValue::from_str(&http_date(now)).map_err(axum::http::Error::from)?,
    );
    headers.insert(
        header::ETAG,
        HeaderValue::from_str(&etag).map_err(axum::http::Error::from)?,
    );
    Ok(response)
}
