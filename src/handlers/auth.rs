//! `/basic-auth/:user/:pass` and `/bearer`.

use axum::{http::header, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;

pub const BASIC_CHALLENGE: &str = "Basic realm=\"Fake Realm\"";
pub const BEARER_CHALLENGE: &str = "Bearer";

pub async fn basic_auth(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let (Some(user), Some(pass)) = (req.route.arg(0), req.route.arg(1)) else {
        return Err(AppError::bad_request("Username and password are required"));
    };

    let credentials = req
        .header(header::AUTHORIZATION)
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or_else(|| AppError::unauthorized("Missing basic credentials", BASIC_CHALLENGE))?;

    let decoded = STANDARD
        .decode(credentials.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AppError::unauthorized("Malformed basic credentials", BASIC_CHALLENGE))?;

    match decoded.split_once(':') {
        Some((u, p)) if u == user && p == pass => {
            response::json(json!({ "authenticated": true, "user": user }))
        }
        _ => Err(AppError::unauthorized("Invalid credentials", BASIC_CHALLENGE)),
    }
}

pub async fn bearer(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let token = req
        .header(header::AUTHORIZATION)
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token", BEARER_CHALLENGE))?;

    response::json(json!({ "authenticated": true, "token": token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{get, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn with_auth(uri: &str, value: &str) -> Request<Body> {
        Request::get(uri)
            .header("authorization", value)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_basic_auth_without_header_challenges() {
        let response = get("/basic-auth/admin/123").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.header("www-authenticate"), Some(BASIC_CHALLENGE));
    }

    #[tokio::test]
    async fn test_basic_auth_success() {
        let value = format!("Basic {}", STANDARD.encode("admin:123"));
        let response = send(with_auth("/basic-auth/admin/123", &value)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"authenticated": true, "user": "admin"}));
    }

    #[tokio::test]
    async fn test_basic_auth_mismatch() {
        for creds in ["admin:1234", "root:123", "admin"] {
            let value = format!("Basic {}", STANDARD.encode(creds));
            let response = send(with_auth("/basic-auth/admin/123", &value)).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{creds}");
        }
        let response = send(with_auth("/basic-auth/admin/123", "Basic !!!")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_basic_auth_requires_path_credentials() {
        assert_eq!(get("/basic-auth/admin").await.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bearer() {
        let response = send(with_auth("/bearer", "Bearer abc.def")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"authenticated": true, "token": "abc.def"}));

        for value in ["Basic abc", "Bearer ", "token"] {
            let response = send(with_auth("/bearer", value)).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{value}");
            assert_eq!(response.header("www-authenticate"), Some(BEARER_CHALLENGE));
        }
        assert_eq!(get("/bearer").await.status, StatusCode::UNAUTHORIZED);
    }
}
