//! Route handlers.
//!
//! Every handler has the shape `async fn(AppState, RouteRequest) -> AppResult<Response>`
//! and is registered by name in [`standard_routes`]. Handlers are stateless;
//! the shared state only carries configuration, assets and the outbound client.

pub mod auth;
pub mod cache;
pub mod cookies;
pub mod dynamic;
pub mod formats;
pub mod inspect;
pub mod markdown;
pub mod mix;
pub mod page_meta;
pub mod qrcode;
pub mod redirect;
pub mod status;
pub mod webhook;

use crate::http::websocket;
use crate::routing::RouteTable;

/// The full edgebin route table.
pub fn standard_routes() -> RouteTable {
    RouteTable::new()
        // HTTP methods
        .route("get", inspect::anything)
        .route("post", inspect::anything)
        .route("put", inspect::anything)
        .route("delete", inspect::anything)
        .route("patch", inspect::anything)
        .route("anything", inspect::anything)
        // Request inspection
        .route("headers", inspect::headers)
        .route("ip", inspect::ip)
        .route("ipgeo", inspect::ip)
        .route("user-agent", inspect::user_agent)
        // Response inspection
        .route("response-headers", inspect::response_headers)
        .route("cache", cache::cache)
        .route("status", status::status)
        // Response formats
        .route("gzip", formats::encoded)
        .route("brotli", formats::encoded)
        .route("deflate", formats::encoded)
        .route("image", formats::image)
        .route("html", formats::sample)
        .route("xml", formats::sample)
        .route("json", formats::sample)
        .route("encoding", formats::encoding)
        .route("robots.txt", formats::robots)
        .route("deny", formats::deny)
        .route("version", formats::version)
        // Auth, cookies, redirects
        .route("basic-auth", auth::basic_auth)
        .route("bearer", auth::bearer)
        .route("cookies", cookies::cookies)
        .route("redirect-to", redirect::redirect_to)
        .route("redirect", redirect::redirect)
        // Dynamic data
        .route("delay", dynamic::delay)
        .route("bytes", dynamic::bytes)
        .route("base64", dynamic::base64)
        .route("uuid", dynamic::uuid)
        .route("date", dynamic::date)
        // Utilities
        .route("qrcode", qrcode::qrcode)
        .route("md2html", markdown::md2html)
        .route("markdown", markdown::md2html)
        .route("html2md", markdown::html2md)
        .route("page-meta", page_meta::page_meta)
        .route("mix", mix::mix)
        .route("webhook", webhook::webhook)
        .route("ws", websocket::upgrade)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_routes_cover_every_name() {
        let routes = standard_routes();
        for name in [
            "get", "post", "put", "delete", "patch", "anything", "headers", "ip", "ipgeo",
            "user-agent", "response-headers", "cache", "status", "gzip", "brotli", "deflate",
            "image", "html", "xml", "json", "encoding", "robots.txt", "deny", "version",
            "basic-auth", "bearer", "cookies", "redirect-to", "redirect", "delay", "bytes",
            "base64", "uuid", "date", "qrcode", "md2html", "markdown", "html2md", "page-meta",
            "mix", "webhook", "ws",
        ] {
            assert!(routes.lookup(name).is_some(), "missing route {name}");
        }
        assert!(routes.lookup("GET").is_none());
    }
}
