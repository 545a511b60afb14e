//! Keeps generated request ids out of echoed request headers.
//!
//! `SetRequestIdLayer` writes a fresh `x-request-id` into every request that
//! arrives without one. [`mark_client_id`] runs outside that layer and records
//! whether the client sent its own id; [`strip_generated`] removes the header
//! again before handlers read the request. Traces and the response header still
//! carry the generated id.

use axum::{extract::Request, middleware::Next, response::Response};

const X_REQUEST_ID: &str = "x-request-id";

/// Marker extension: the client supplied `x-request-id` itself.
#[derive(Debug, Clone, Copy)]
struct ClientRequestId;

pub async fn mark_client_id(mut request: Request, next: Next) -> Response {
    if request.headers().contains_key(X_REQUEST_ID) {
        request.extensions_mut().insert(ClientRequestId);
    }
    next.run(request).await
}

/// Drop `x-request-id` unless the client sent it.
pub fn strip_generated(request: &mut Request) {
    if request.extensions().get::<ClientRequestId>().is_none() {
        request.headers_mut().remove(X_REQUEST_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;
    use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

    /// Answers with the request id the handler would see, or `none`.
    async fn seen(mut request: Request) -> String {
        strip_generated(&mut request);
        request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(seen))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(middleware::from_fn(mark_client_id))
    }

    async fn body_of(request: Request<Body>) -> String {
        let response = app().oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_generated_id_is_hidden() {
        let body = body_of(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(body, "none");
    }

    #[tokio::test]
    async fn test_client_id_is_kept() {
        let request = Request::get("/")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(request).await, "abc-123");
    }
}
