//! `/mix`: echo the request body with a caller-chosen status, headers and delay.
//!
//! - `s=<code>` response status (default 200)
//! - `d=<seconds>` delay before answering, clamped like `/delay`
//! - `h=<name>:<value>` response header, repeatable; malformed entries are skipped

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use std::time::Duration;

use crate::handlers::dynamic::clamp_delay;
use crate::http::error::{AppError, AppResult};
use crate::http::params::parse_number;
use crate::http::request::RouteRequest;
use crate::http::server::AppState;

pub async fn mix(_state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let status = match req.query.get_non_empty("s") {
        None => StatusCode::OK,
        Some(raw) => StatusCode::from_u16(parse_number(raw)?)
            .map_err(|_| AppError::bad_request(format!("Invalid status: {raw}")))?,
    };
    let delay = req.query.get_non_empty("d").map(clamp_delay).transpose()?;
    let extra: Vec<_> = req.query.get_all("h").filter_map(parse_header).collect();
    let content_type = req.headers().get(header::CONTENT_TYPE).cloned();

    if let Some(secs) = delay {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    let body = req.bytes().await?;
    let mut response = Response::builder().status(status).body(Body::from(body))?;
    let headers = response.headers_mut();
    if let Some(ct) = content_type {
        headers.insert(header::CONTENT_TYPE, ct);
    }
    for (name, value) in extra {
        headers.append(name, value);
    }
    Ok(response)
}

/// `name:value`, split on the first colon. Empty names and invalid header text yield `None`.
fn parse_header(spec: &str) -> Option<(HeaderName, HeaderValue)> {
    let (name, value) = spec.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((
        HeaderName::from_bytes(name.as_bytes()).ok()?,
        HeaderValue::from_str(value.trim()).ok()?,
    ))
}
