//! Response construction and error translation.
//!
//! # Responsibilities
//! - Render [`AppError`] into the client-facing response
//! - Small builders shared by handlers (JSON, redirects, 404)
//!
//! # Design Decisions
//! - Declared errors: JSON `{message, code, url}` with status = code
//! - Unexpected errors: HTML debug snippet with status 499, logged once
//! - No handler renders its own errors

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::error::Error as _;

use crate::http::error::{AppError, AppResult};

/// Translate a handler failure into a response.
pub fn error_response(err: AppError, url: &str) -> Response {
    let status = err.status();
    match err {
        AppError::Custom {
            message,
            code,
            challenge,
        } => {
            tracing::debug!(url = %url, code = code.as_u16(), message = %message, "Declared error");
            let mut response = (
                code,
                Json(json!({
                    "message": message,
                    "code": code.as_u16(),
                    "url": url,
                })),
            )
                .into_response();
            if let Some(challenge) = challenge {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
            }
            response
        }
        other => {
            let chain = source_chain(&other);
            tracing::error!(url = %url, error = %other, chain = %chain, "Handle request failed");
            let html = format!(
                "<h1>{}</h1><p>{}</p>",
                escape_html(&other.to_string()),
                escape_html(&chain)
            );
            (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response()
        }
    }
}

fn source_chain(err: &AppError) -> String {
    let mut lines = vec![format!("{err:?}")];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 200 JSON response.
pub fn json<T: Serialize>(value: T) -> AppResult<Response> {
    Ok(Json(value).into_response())
}

/// JSON pretty-printed with two-space indentation.
pub fn pretty_json<T: Serialize>(value: &T) -> AppResult<Response> {
    let body = serde_json::to_string_pretty(value)?;
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(body))?)
}

/// 302 to `location`, which may be relative. A location that is not a
/// valid header value is a declared 400.
pub fn redirect(location: &str) -> AppResult<Response> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| AppError::bad_request(format!("Invalid redirect location: {location:?}")))?;
    Ok(Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())?)
}

/// 404 for paths nothing answers.
pub fn not_found(url: &str, pathname: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": format!("'{url}' not found"),
            "pathname": pathname,
        })),
    )
        .into_response()
}
