//! Markdown ↔ HTML conversion.
//!
//! Input precedence: `url` (fetched), then the request body, then the `text`
//! query parameter. A fetched source must answer 2xx with a textual content type
//! and fit in `upstream.max_body_size`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use pulldown_cmark::{html, Options, Parser};

use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::server::AppState;
use crate::http::upstream::BoundedBody;

pub async fn md2html(state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let markdown = read_input(&state, &mut req).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        render_html(&markdown),
    )
        .into_response())
}

pub async fn html2md(state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let html = read_input(&state, &mut req).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        ::html2md::parse_html(&html),
    )
        .into_response())
}

pub fn render_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

async fn read_input(state: &AppState, req: &mut RouteRequest) -> AppResult<String> {
    if let Some(url) = req.query.get_non_empty("url").map(str::to_string) {
        return fetch_source(state, &url).await;
    }

    let body = req.text().await?;
    if !body.is_empty() {
        return Ok(body);
    }

    req.query
        .get_non_empty("text")
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request("No input provided, send a body or set 'text' or 'url'"))
}

async fn fetch_source(state: &AppState, url: &str) -> AppResult<String> {
    let response = state
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to fetch URL: {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(url = %url, status = status.as_u16(), "Markdown source fetch failed");
        return Err(AppError::custom(format!("Failed to fetch URL: {url}"), status));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !is_textual(&content_type) {
        return Err(AppError::bad_request(format!(
            "Unsupported content type from {url}: {content_type}"
        )));
    }

    let bytes = BoundedBody::new(response, state.config.upstream.max_body_size)?
        .collect()
        .await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `text/*` plus the structured-text application types.
fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || ["markdown", "html", "xml", "json"]
            .iter()
            .any(|kind| content_type.contains(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{get, send};
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_render_html() {
        assert_eq!(render_html("Nice to see you!"), "<p>Nice to see you!</p>\n");
        assert!(render_html("| a |\n|---|\n| 1 |").contains("<table>"));
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/markdown; charset=utf-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(!is_textual("image/png"));
    }

    #[tokio::test]
    async fn test_md2html_from_text_param() {
        let response = get("/markdown?text=Nice%20to%20see%20you!").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "<p>Nice to see you!</p>\n");
        assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_body_wins_over_text_param() {
        let response = send(
            Request::post("/md2html?text=ignored")
                .body(Body::from("# Title"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.text(), "<h1>Title</h1>\n");
    }

    #[tokio::test]
    async fn test_html2md() {
        let response = send(
            Request::post("/html2md")
                .body(Body::from("<h1>Hello</h1>"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.text().contains("Hello"));
        assert_eq!(
            response.header("content-type"),
            Some("text/markdown; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn test_missing_input() {
        assert_eq!(get("/md2html").await.status, StatusCode::BAD_REQUEST);
        assert_eq!(get("/html2md").await.status, StatusCode::BAD_REQUEST);
    }
}
