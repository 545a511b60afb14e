//! Echo routes: method echo, headers, client IP/geo, user agent, response headers.

use axum::{
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::http::body::describe_body;
use crate::http::error::AppResult;
use crate::http::params::{fold_pairs, headers_to_json};
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;

/// Structured description of the request: args, headers, origin, url, method
/// and the interpreted body. `raw=1` swaps body parsing for the raw text plus
/// the full client metadata under `cf`.
pub async fn describe_request(req: &mut RouteRequest) -> AppResult<Map<String, Value>> {
    let mut out = Map::new();
    out.insert("args".into(), Value::Object(req.query.to_json()));
    out.insert("headers".into(), Value::Object(headers_to_json(req.headers())));
    out.insert("origin".into(), json!(req.client.origin));
    out.insert("url".into(), json!(req.url));
    out.insert("method".into(), json!(req.method().as_str()));

    if req.query.get("raw") == Some("1") {
        out.insert("cf".into(), serde_json::to_value(&req.client.geo)?);
        out.insert("body".into(), Value::String(req.text().await?));
    } else {
        out.extend(describe_body(req).await?);
    }
    Ok(out)
}

pub async fn anything(_state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    response::json(describe_request(&mut req).await?)
}

pub async fn headers(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    response::json(headers_to_json(req.headers()))
}

/// `/ip` and `/ipgeo`: origin plus whatever geo metadata the edge supplied.
pub async fn ip(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let mut out = Map::new();
    out.insert("origin".into(), json!(req.client.origin));
    if let Value::Object(geo) = serde_json::to_value(&req.client.geo)? {
        out.extend(geo);
    }
    response::json(out)
}

pub async fn user_agent(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let agent = req.header(header::USER_AGENT).unwrap_or("unknown");
    response::json(json!({ "user-agent": agent }))
}

/// Body: request headers with the query folded in. Every query pair is also
/// appended as a response header; pairs that are not valid headers are skipped.
pub async fn response_headers(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let mut body = headers_to_json(req.headers());
    fold_pairs(&mut body, req.query.iter());

    let mut response = Json(body).into_response();
    for (key, value) in req.query.iter() {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            }
            _ => tracing::debug!(key = %key, "Skipping invalid response header"),
        }
    }
    Ok(response)
}
