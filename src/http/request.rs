//! Request context handed to every route handler.
//!
//! # Responsibilities
//! - Reconstruct the absolute request URL
//! - Parse path segments and query parameters once
//! - Infer the client IP and geo metadata from edge headers
//! - Give handlers owned access to the body
//!
//! # Design Decisions
//! - Geo data comes from Cloudflare visitor-location headers; nothing is looked up
//! - The peer address is only a fallback for the client IP
//! - Headers and request parts stay untouched so upgrades still work

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{header, request::Parts, HeaderMap, Method, Request},
};
use serde::Serialize;
use std::net::SocketAddr;

use crate::http::error::AppResult;
use crate::http::params::QueryParams;
use crate::routing::matcher::ParsedRoute;

/// A parsed inbound request, immutable except for its body.
#[derive(Debug)]
pub struct RouteRequest {
    pub parts: Parts,
    body: Body,
    pub route: ParsedRoute,
    pub query: QueryParams,
    pub client: ClientInfo,
    /// Absolute URL as the client addressed it.
    pub url: String,
}

impl RouteRequest {
    pub fn new(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        let route = ParsedRoute::parse(parts.uri.path());
        let query = QueryParams::parse(parts.uri.query());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = ClientInfo::from_headers(&parts.headers, peer);
        let url = absolute_url(&parts);

        Self {
            parts,
            body,
            route,
            query,
            client,
            url,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Header value as text, if present and valid.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Content-Type` of the request, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    /// Path without the query string.
    pub fn pathname(&self) -> &str {
        self.parts.uri.path()
    }

    /// Take the body out of the request. Later calls yield an empty body.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Buffer the whole body. Size is bounded by the body limit layer; going
    /// over it is a declared 413 even when the body is chunked.
    pub async fn bytes(&mut self) -> AppResult<Bytes> {
        let body = self.take_body();
        Ok(axum::body::to_bytes(body, usize::MAX).await?)
    }

    /// Buffer the whole body as (lossy) UTF-8 text.
    pub async fn text(&mut self) -> AppResult<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Rebuild a bare request carrying this request's headers and body.
    pub fn body_request(&mut self) -> Request<Body> {
        let mut request = Request::new(self.take_body());
        *request.headers_mut() = self.parts.headers.clone();
        request
    }
}

fn absolute_url(parts: &Parts) -> String {
    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or("http");
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{scheme}://{host}{path_and_query}")
}

/// Who sent the request, as far as the edge headers tell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientInfo {
    pub origin: Option<String>,
    pub geo: GeoInfo,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let origin = text("cf-connecting-ip")
            .or_else(|| {
                text("x-forwarded-for")
                    .and_then(|v| v.split(',').next())
                    .map(str::trim)
            })
            .or_else(|| text("x-real-ip"))
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        let owned = |name: &str| text(name).map(str::to_string);
        let number = |name: &str| text(name).and_then(|v| v.parse::<f64>().ok());

        let geo = GeoInfo {
            continent: owned("cf-ipcontinent"),
            latitude: number("cf-iplatitude"),
            longitude: number("cf-iplongitude"),
            country: owned("cf-ipcountry"),
            region: owned("cf-region"),
            region_code: owned("cf-region-code"),
            city: owned("cf-ipcity"),
            postal_code: owned("cf-postal-code"),
            timezone: owned("cf-timezone"),
            metro_code: owned("cf-metro-code"),
            colo: text("cf-ray")
                .and_then(|ray| ray.rsplit_once('-'))
                .map(|(_, colo)| colo.to_string()),
        };

        Self { origin, geo }
    }
}

/// Approximate location of the client. Absent fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro_code: Option<String>,
    /// Data center that served the request, from the `cf-ray` suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colo: Option<String>,
}
