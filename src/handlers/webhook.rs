//! `/webhook?from=github&to=telegram`: relay GitHub events to a Telegram chat.
//!
//! # Responsibilities
//! - Validate the source (`from`/`to`, `GitHub-Hookshot` user agent)
//! - Turn `issues`, `discussion` and `pull_request` payloads into a MarkdownV2 link
//! - POST it to the Bot API `sendMessage` method and relay Telegram's answer
//!
//! # Design Decisions
//! - Actions other than the one an event cares about answer 200 with a
//!   `msg` explaining why nothing was sent, so GitHub does not mark the
//!   delivery as failed.
//! - A single attempt per delivery; transport errors surface as unhandled.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use serde_json::{json, Value};

use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;
use crate::http::upstream::BoundedBody;

/// Characters Telegram requires escaped in MarkdownV2 text.
const MARKDOWN_V2_SPECIAL: &str = "-_*[]()~`>#+=|{}.!";

/// A formatted message ready for Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub link: String,
}

/// What an event payload turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Send(Notification),
    /// Recognised event, ignored action.
    Skip(String),
}

pub async fn webhook(state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let (Some(from), Some(to)) = (req.query.get_non_empty("from"), req.query.get_non_empty("to"))
    else {
        return Err(AppError::bad_request("Missing 'from' or 'to' parameter"));
    };
    if from != "github" || to != "telegram" {
        return Err(AppError::bad_request("Unsupported 'from' or 'to' value"));
    }

    let user_agent = req.header(header::USER_AGENT).unwrap_or_default();
    if !user_agent.contains("GitHub-Hookshot") {
        return Err(AppError::bad_request("Not a GitHub webhook"));
    }

    let event = req.header("x-github-event").unwrap_or_default().to_string();
    if event == "ping" {
        return response::json(json!({ "msg": "pong" }));
    }

    let (Some(token), Some(chat_id)) = (
        req.query.get_non_empty("tg_token").map(str::to_string),
        req.query.get_non_empty("tg_chat_id").map(str::to_string),
    ) else {
        return Err(AppError::bad_request("Missing 'tg_token' or 'tg_chat_id' parameter"));
    };

    let body = req.bytes().await?;
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Invalid webhook payload: {e}")))?;

    match format_event(&event, &payload)? {
        Outcome::Skip(msg) => {
            tracing::debug!(event = %event, msg = %msg, "Webhook event skipped");
            response::json(json!({ "msg": msg }))
        }
        Outcome::Send(notification) => {
            send_telegram(&state, &token, &chat_id, &notification).await
        }
    }
}

/// Map a GitHub event payload to a message, without any I/O.
pub fn format_event(event: &str, payload: &Value) -> AppResult<Outcome> {
    let action = payload["action"].as_str().unwrap_or_default();
    match event {
        "issues" => {
            if action != "opened" {
                return Ok(skip("issues", "opened", action));
            }
            let issue = &payload["issue"];
            let link = field(issue, "html_url")?;
            Ok(Outcome::Send(Notification {
                text: format!("[{}]({link})", escape_markdown_v2(field(issue, "title")?)),
                link: link.to_string(),
            }))
        }
        "discussion" => {
            if action != "created" {
                return Ok(skip("discussion", "created", action));
            }
            let discussion = &payload["discussion"];
            let link = field(discussion, "html_url")?;
            let category = field(&discussion["category"], "name")?;
            Ok(Outcome::Send(Notification {
                text: format!(
                    "[{}]({link}) in {category}",
                    escape_markdown_v2(field(discussion, "title")?)
                ),
                link: link.to_string(),
            }))
        }
        "pull_request" => {
            if action != "opened" {
                return Ok(skip("pull_request", "opened", action));
            }
            let pull = &payload["pull_request"];
            let link = field(pull, "html_url").or_else(|_| field(pull, "url"))?;
            Ok(Outcome::Send(Notification {
                text: format!("[{}]({link})", escape_markdown_v2(field(pull, "title")?)),
                link: link.to_string(),
            }))
        }
        other => Err(AppError::bad_request(format!("Unsupported GitHub event: {other}"))),
    }
}

fn skip(event: &str, wanted: &str, action: &str) -> Outcome {
    Outcome::Skip(format!(
        "{event} only handles the {wanted} action, current: {action}"
    ))
}

fn field<'a>(object: &'a Value, key: &str) -> AppResult<&'a str> {
    object[key]
        .as_str()
        .ok_or_else(|| AppError::bad_request(format!("Webhook payload is missing '{key}'")))
}

pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

async fn send_telegram(
    state: &AppState,
    token: &str,
    chat_id: &str,
    notification: &Notification,
) -> AppResult<Response> {
    let api = format!(
        "{}/bot{token}/sendMessage",
        state.config.upstream.telegram_api_base.trim_end_matches('/')
    );
    let payload = json!({
        "text": notification.text,
        "chat_id": chat_id,
        "parse_mode": "MarkdownV2",
        "link_preview_options": { "url": notification.link },
    });
    tracing::info!(chat_id = %chat_id, text = %notification.text, "Relaying webhook to Telegram");

    let upstream = state.client.post(api).json(&payload).send().await?;
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let body = BoundedBody::new(upstream, state.config.upstream.max_body_size)?
        .collect()
        .await?;

    let mut builder = Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    Ok(builder.body(Body::from(body))?)
}
