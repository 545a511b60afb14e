//! `/page-meta?url=`: fetch a page and report its `<title>` and `<meta>` tags.
//!
//! Extraction runs the HTML through `lol_html` chunk by chunk as it downloads:
//! a text handler accumulates the title, an element handler collects
//! `name`/`property` → `content` pairs. No DOM is built. The rewriter is not
//! `Send`, so it lives on a blocking thread fed over a channel.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName},
    response::Response,
};
use lol_html::{element, errors::RewritingError, text, HtmlRewriter, Settings};
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;

use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;
use crate::http::upstream::BoundedBody;

/// Chunks buffered between the download and the rewriter thread.
const PENDING_CHUNKS: usize = 16;

/// Request headers that describe this hop and must not be forwarded.
const SKIPPED_HEADERS: [HeaderName; 9] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
    header::PROXY_AUTHORIZATION,
];

/// Title and meta pairs in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub tags: Vec<(String, String)>,
}

/// Feed HTML `chunks` through the tokenizer and collect title + meta tags.
///
/// The first non-empty `<title>` wins, so an inline `<svg><title>` in the body
/// never replaces the document title.
pub fn extract_meta<I, B>(chunks: I) -> Result<PageMeta, RewritingError>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut title: Option<String> = None;
    let mut buffer = String::new();
    let mut tags = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("meta", |el| {
                    let name = el
                        .get_attribute("name")
                        .filter(|n| !n.is_empty())
                        .or_else(|| el.get_attribute("property").filter(|p| !p.is_empty()));
                    let content = el.get_attribute("content").filter(|c| !c.is_empty());
                    if let (Some(name), Some(content)) = (name, content) {
                        tags.push((name, content));
                    }
                    Ok(())
                }),
                text!("title", |chunk| {
                    buffer.push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        let trimmed = buffer.trim();
                        if title.is_none() && !trimmed.is_empty() {
                            title = Some(trimmed.to_string());
                        }
                        buffer.clear();
                    }
                    Ok(())
                }),
            ],
            ..Settings::new()
        },
        |_: &[u8]| {},
    );

    for chunk in chunks {
        rewriter.write(chunk.as_ref())?;
    }
    rewriter.end()?;

    Ok(PageMeta { title, tags })
}

fn forward_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = incoming.clone();
    for name in &SKIPPED_HEADERS {
        headers.remove(name);
    }
    headers
}

pub async fn page_meta(state: AppState, req: RouteRequest) -> AppResult<Response> {
    let url = req
        .query
        .get_non_empty("url")
        .ok_or_else(|| AppError::bad_request("No url param found"))?;

    let upstream = state
        .client
        .get(url)
        .headers(forward_headers(req.headers()))
        .send()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to fetch the URL: {e}")))?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(AppError::bad_request(format!(
            "Failed to fetch the URL: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )));
    }

    let final_url = upstream.url().to_string();
    let is_html = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));

    if !is_html {
        tracing::debug!(url = %final_url, "Passing through non-HTML page");
        return passthrough(upstream, state.config.upstream.max_body_size);
    }

    let body = BoundedBody::new(upstream, state.config.upstream.max_body_size)?;
    let meta = stream_meta(body).await?;

    let mut out = Map::new();
    out.insert("title".into(), json!(meta.title));
    out.insert("url".into(), json!(final_url));
    for (name, content) in meta.tags {
        out.insert(name, Value::String(content));
    }
    response::pretty_json(&Value::Object(out))
}

/// Hand downloaded chunks to a blocking rewriter thread as they arrive.
async fn stream_meta(mut body: BoundedBody) -> AppResult<PageMeta> {
    let (tx, mut rx) = mpsc::channel::<Bytes>(PENDING_CHUNKS);
    let worker =
        tokio::task::spawn_blocking(move || extract_meta(std::iter::from_fn(move || rx.blocking_recv())));

    while let Some(chunk) = body.next_chunk().await? {
        if tx.send(chunk).await.is_err() {
            // Rewriter already failed; its error is returned below.
            break;
        }
    }
    drop(tx);

    Ok(worker.await??)
}

/// Relay an upstream response unchanged, minus framing headers. The body is
/// streamed through and cut off past `limit` bytes.
fn passthrough(upstream: reqwest::Response, limit: usize) -> AppResult<Response> {
    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if name != header::TRANSFER_ENCODING && name != header::CONNECTION {
            builder = builder.header(name, value);
        }
    }
    let body = BoundedBody::new(upstream, limit)?;
    Ok(builder.body(Body::from_stream(body.into_stream()))?)
}
