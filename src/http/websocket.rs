//! `/ws` echo sessions.
//!
//! # Responsibilities
//! - Validate the upgrade request and complete the handshake
//! - Own the socket for the whole session, one message at a time
//! - Answer the `close`, `date` and `ping` commands; echo everything else
//!
//! # Data Flow
//! ```text
//! Client ── text/binary ──→ session loop ──→ reply() ──→ Client
//!                                 │
//!                                 └── "close" → Close(1000) and stop
//! ```
//!
//! # Design Decisions
//! - No split into reader/writer tasks; a single task both receives and sends
//! - `date` uses the client's time zone from geo headers, else the configured default
//! - Protocol-level pings are answered by axum itself

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        FromRequestParts,
    },
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{Locale, Utc};
use chrono_tz::Tz;

use crate::handlers::dynamic::{parse_time_zone, render_date, DateFormat};
use crate::http::error::{AppError, AppResult};
use crate::http::request::RouteRequest;
use crate::http::server::AppState;
use crate::observability::metrics;

/// What the session does with one inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Close,
}

pub async fn upgrade(state: AppState, mut req: RouteRequest) -> AppResult<Response> {
    let wants_websocket = req
        .header(header::UPGRADE)
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));
    if !wants_websocket {
        return Err(AppError::bad_request("Expected websocket"));
    }

    let tz = session_time_zone(&state, &req)?;
    let ws = WebSocketUpgrade::from_request_parts(&mut req.parts, &state)
        .await
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let client = req.client.origin.clone().unwrap_or_default();
    metrics::record_websocket_session();
    Ok(ws
        .on_upgrade(move |socket| async move {
            tracing::debug!(client = %client, tz = %tz, "WebSocket session opened");
            session(socket, tz).await;
            tracing::debug!(client = %client, "WebSocket session closed");
        })
        .into_response())
}

fn session_time_zone(state: &AppState, req: &RouteRequest) -> AppResult<Tz> {
    if let Some(tz) = req
        .client
        .geo
        .timezone
        .as_deref()
        .and_then(|raw| raw.parse::<Tz>().ok())
    {
        return Ok(tz);
    }
    parse_time_zone(&state.config.websocket.default_time_zone)
}

/// Reply for a text message.
pub fn reply(text: &str, tz: Tz) -> Reply {
    match text {
        "close" => Reply::Close,
        "date" => {
            let date = render_date(Utc::now(), DateFormat::Locale, tz, Locale::en_US);
            Reply::Text(date.as_str().map(str::to_string).unwrap_or_default())
        }
        "ping" => Reply::Text("pong".to_string()),
        other => Reply::Text(other.to_string()),
    }
}

async fn session(mut socket: WebSocket, tz: Tz) {
    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket receive failed");
                return;
            }
        };

        let outgoing = match message {
            Message::Text(text) => match reply(text.as_str(), tz) {
                Reply::Text(answer) => Message::Text(answer.into()),
                Reply::Close => Message::Close(Some(CloseFrame {
                    code: close_code::NORMAL,
                    reason: "Normal Closure".into(),
                })),
            },
            Message::Binary(bytes) => Message::Binary(bytes),
            Message::Close(_) => return,
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        let closing = matches!(outgoing, Message::Close(_));
        if let Err(e) = socket.send(outgoing).await {
            tracing::debug!(error = %e, "WebSocket send failed");
            return;
        }
        if closing {
            return;
        }
    }
}
