//! Sample documents, images, charset rewriting and content-encoding echoes.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::assets::Asset;
use crate::handlers::inspect::describe_request;
use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::server::AppState;

/// Image formats by path name, with their asset key and media type.
const IMAGES: &[(&str, &str, &str)] = &[
    ("webp", "image.webp", "image/webp"),
    ("svg", "image.svg", "image/svg+xml"),
    ("jpeg", "image.jpeg", "image/jpeg"),
    ("png", "image.png", "image/png"),
];

fn asset(state: &AppState, key: &str) -> AppResult<Asset> {
    state
        .assets
        .get(key)
        .ok_or_else(|| AppError::custom(format!("Asset not found: {key}"), StatusCode::NOT_FOUND))
}

/// `/gzip`, `/brotli`, `/deflate`: request echo plus a flag and a
/// `Content-Encoding` header. The body itself is sent uncompressed.
pub async fn encoded(_state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let (flag, encoding) = match req.route.name() {
        "gzip" => ("gzipped", "gzip"),
        "brotli" => ("brotli", "br"),
        _ => ("deflated", "deflate"),
    };
    let mut body = describe_request(&mut req).await?;
    body.insert(flag.into(), Value::Bool(true));

    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
    Ok(response)
}

/// `/image[/:format]`, falling back to the `Accept` header.
pub async fn image(state: AppState, req: RouteRequest) -> AppResult<Response> {
    let selected = match req.route.arg(0) {
        Some(format) => {
            let format = if format == "jpg" { "jpeg" } else { format };
            IMAGES.iter().find(|(name, _, _)| *name == format)
        }
        None => negotiate_image(req.headers()),
    };
    let (_, key, _) = selected.ok_or_else(|| {
        AppError::custom("Unsupported image format", StatusCode::NOT_ACCEPTABLE)
    })?;
    Ok(asset(&state, key)?.into_response())
}

fn negotiate_image(headers: &HeaderMap) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())?
        .to_ascii_lowercase();
    IMAGES
        .iter()
        .find(|(_, _, media)| accept.contains(media))
        .or_else(|| {
            accept
                .contains("image/*")
                .then(|| IMAGES.iter().find(|(name, _, _)| *name == "png"))
                .flatten()
        })
}

/// `/html`, `/xml`, `/json`.
pub async fn sample(state: AppState, req: RouteRequest) -> AppResult<Response> {
    let key = format!("response.{}", req.route.name());
    Ok(asset(&state, &key)?.into_response())
}

/// `/encoding[/:charset]`: the sample HTML, optionally relabelled as GB2312.
pub async fn encoding(state: AppState, req: RouteRequest) -> AppResult<Response> {
    let page = asset(&state, "response.html")?;
    match req.route.arg(0).map(str::to_ascii_lowercase).as_deref() {
        None | Some("utf-8") | Some("utf8") => Ok(page.into_response()),
        Some("gb2312") => {
            let html = String::from_utf8_lossy(&page.bytes)
                .replace("charset=\"utf-8\"", "charset=\"gb2312\"")
                .replace("charset=utf-8", "charset=gb2312");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=gb2312")],
                html,
            )
                .into_response())
        }
        Some(other) => Err(AppError::bad_request(format!("Unsupported charset: {other}"))),
    }
}

pub async fn robots(state: AppState, _req: RouteRequest) -> AppResult<Response> {
    Ok(asset(&state, "robots.txt")?.into_response())
}

pub async fn deny(state: AppState, _req: RouteRequest) -> AppResult<Response> {
    Ok(asset(&state, "deny.txt")?.into_response())
}

/// `version.json` when the asset store has one, else the running build.
pub async fn version(state: AppState, _req: RouteRequest) -> AppResult<Response> {
    match state.assets.get("version.json") {
        Some(asset) => Ok(asset.into_response()),
        None => Ok(Json(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response()),
    }
}
