//! `/redirect-to?url=` and `/redirect/:n`.

use axum::response::Response;

use crate::http::error::{AppError, AppResult};
use crate::http::params::parse_number;
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;

pub const MAX_REDIRECTS: i64 = 10;

pub async fn redirect_to(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let url = req
        .query
        .get_non_empty("url")
        .ok_or_else(|| AppError::bad_request("url parameter is required"))?;
    response::redirect(url)
}

/// Count down `/redirect/n` → `/redirect/n-1` → … → `/get`.
pub async fn redirect(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let raw = req
        .route
        .arg(0)
        .ok_or_else(|| AppError::bad_request("Redirect count is required"))?;
    let count: i64 = parse_number(raw)?;
    if !(1..=MAX_REDIRECTS).contains(&count) {
        return Err(AppError::bad_request(format!(
            "Redirect count must be between 1 and {MAX_REDIRECTS}, got {count}"
        )));
    }

    let location = match count {
        1 => "/get".to_string(),
        n => format!("/redirect/{}", n - 1),
    };
    response::redirect(&location)
}
