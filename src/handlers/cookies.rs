//! `/cookies`, `/cookies/set`, `/cookies/delete`.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use serde_json::{json, Map, Value};

use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;

const EXPIRED: &str = "Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

pub async fn cookies(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    match req.route.arg(0) {
        None => response::json(json!({ "cookies": parse_cookies(req.headers()) })),
        Some("set") => redirect_with_cookies(
            req.query.iter().map(|(name, value)| format!("{name}={value}; Path=/")),
        ),
        Some("delete") => redirect_with_cookies(
            req.query.iter().map(|(name, _)| format!("{name}=; Path=/; {EXPIRED}")),
        ),
        Some(other) => Err(AppError::bad_request(format!(
            "Unsupported cookies action: {other}"
        ))),
    }
}

/// 302 to `/cookies`. Cookies that are not valid header text are skipped.
fn redirect_with_cookies(cookies: impl Iterator<Item = String>) -> AppResult<Response> {
    let mut builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, "/cookies");
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => builder = builder.header(header::SET_COOKIE, value),
            Err(_) => tracing::debug!(cookie = ?cookie, "Skipping invalid cookie"),
        }
    }
    Ok(builder.body(Body::empty())?)
}

/// Every `Cookie` header split into `name → value`. Later duplicates win.
pub fn parse_cookies(headers: &HeaderMap) -> Map<String, Value> {
    let mut cookies = Map::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies.insert(name.to_string(), Value::String(value.trim().to_string()));
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{get, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_set_redirects_with_cookies() {
        let response = get("/cookies/set?name1=value1&name2=value2").await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/cookies"));
        let cookies: Vec<_> = response
            .headers
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, vec!["name1=value1; Path=/", "name2=value2; Path=/"]);
    }

    #[tokio::test]
    async fn test_set_skips_invalid_cookie_values() {
        let response = get("/cookies/set?a=%0Ab&good=1").await;
        assert_eq!(response.status, StatusCode::FOUND);
        let cookies: Vec<_> = response
            .headers
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, vec!["good=1; Path=/"]);
    }

    #[tokio::test]
    async fn test_delete_expires_cookies() {
        let response = get("/cookies/delete?name1").await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(
            response.header("set-cookie"),
            Some("name1=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
        );
    }

    #[tokio::test]
    async fn test_cookie_header_is_parsed() {
        let response = send(
            Request::get("/cookies")
                .header("cookie", "name1=value1; name2=value2; token=a=b")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(
            response.json(),
            json!({"cookies": {"name1": "value1", "name2": "value2", "token": "a=b"}})
        );
        assert_eq!(get("/cookies").await.json(), json!({"cookies": {}}));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        assert_eq!(get("/cookies/eat").await.status, StatusCode::BAD_REQUEST);
    }
}
