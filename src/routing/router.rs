//! Route table and dispatch.
//!
//! # Responsibilities
//! - Map a route name (first path segment) to its handler
//! - Serve the index page for the root path
//! - Fall back to the asset store, or a JSON 404, for unknown names
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(1) lookup via HashMap; names are compared literally
//! - Every handler has the same `(state, request) -> response | error` shape,
//!   so each can be exercised alone without the full server

use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::error::AppResult;
use crate::http::request::RouteRequest;
use crate::http::response::not_found;
use crate::http::server::AppState;
use crate::routing::matcher::ParsedRoute;

pub type HandlerFuture = Pin<Box<dyn Future<Output = AppResult<Response>> + Send>>;

/// A route handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, state: AppState, req: RouteRequest) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(AppState, RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Response>> + Send + 'static,
{
    fn call(&self, state: AppState, req: RouteRequest) -> HandlerFuture {
        Box::pin(self(state, req))
    }
}

/// Route name → handler.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<&'static str, Arc<dyn Handler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. A later registration replaces an earlier one.
    pub fn route<H: Handler>(mut self, name: &'static str, handler: H) -> Self {
        self.routes.insert(name, Arc::new(handler));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.routes.get(name).cloned()
    }

    /// Low-cardinality label for metrics.
    pub fn label(&self, route: &ParsedRoute) -> &'static str {
        if route.is_root() {
            return "index";
        }
        match self.routes.get_key_value(route.name()) {
            Some((name, _)) => *name,
            None => "fallback",
        }
    }
}

/// Resolve `req` against the state's route table and run the handler.
pub async fn dispatch(state: AppState, req: RouteRequest) -> AppResult<Response> {
    if req.route.is_root() {
        return Ok(match state.assets.get("index.html") {
            Some(asset) => asset.into_response(),
            None => not_found(&req.url, req.pathname()),
        });
    }

    let routes = Arc::clone(&state.routes);
    if let Some(handler) = routes.lookup(req.route.name()) {
        return handler.call(state, req).await;
    }

    Ok(fallback(&state, &req))
}

fn fallback(state: &AppState, req: &RouteRequest) -> Response {
    if state.config.routing.strict_api {
        return not_found(&req.url, req.pathname());
    }
    match state.assets.get(&req.route.asset_key()) {
        Some(asset) => asset.into_response(),
        None => {
            tracing::debug!(path = %req.pathname(), "No route or asset");
            not_found(&req.url, req.pathname())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::config::EdgebinConfig;
    use crate::http::error::AppError;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn state(routes: RouteTable, strict_api: bool) -> AppState {
        let mut config = EdgebinConfig::default();
        config.routing.strict_api = strict_api;
        AppState::with_routes(config, Arc::new(MemoryAssetStore::builtin()), routes)
            .unwrap()
    }

    fn request(uri: &str) -> RouteRequest {
        RouteRequest::new(
            Request::builder()
                .uri(uri)
                .header("host", "edgebin.test")
                .body(Body::empty())
                .unwrap(),
        )
    }

    fn table() -> RouteTable {
        RouteTable::new()
            .route("hello", |_: AppState, req: RouteRequest| async move {
                Ok::<_, AppError>(
                    format!("hello {}", req.route.arg(0).unwrap_or("world")).into_response(),
                )
            })
            .route("fail", |_: AppState, _: RouteRequest| async move {
                Err::<Response, _>(AppError::bad_request("nope"))
            })
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_by_first_segment() {
        let response = dispatch(state(table(), false), request("/hello/rust"))
            .await
            .unwrap();
        assert_eq!(body(response).await, "hello rust");
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let err = dispatch(state(table(), false), request("/fail"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let response = dispatch(state(table(), false), request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("<title>edgebin</title>"));
    }

    #[tokio::test]
    async fn test_unknown_route_falls_back_to_assets() {
        let response = dispatch(state(table(), false), request("/robots.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("Disallow: /deny"));

        let response = dispatch(state(table(), false), request("/nothing-here"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_strict_api_skips_assets() {
        let response = dispatch(state(table(), true), request("/robots.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["pathname"], "/robots.txt");
        assert_eq!(json["error"], "'http://edgebin.test/robots.txt' not found");
    }

    #[test]
    fn test_labels() {
        let routes = table();
        assert_eq!(routes.label(&ParsedRoute::parse("/")), "index");
        assert_eq!(routes.label(&ParsedRoute::parse("/hello/x")), "hello");
        assert_eq!(routes.label(&ParsedRoute::parse("/zzz")), "fallback");
        assert!(routes.lookup("fail").is_some());
        assert!(routes.lookup("index").is_none());
    }
}
