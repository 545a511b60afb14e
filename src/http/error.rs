//! Handler error taxonomy.
//!
//! Handlers never translate their own failures. They return an [`AppError`]
//! and the dispatch entry point renders it exactly once (see
//! [`crate::http::response::error_response`]).

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use http_body_util::LengthLimitError;
use thiserror::Error;

/// Status used for failures nobody anticipated.
///
/// Non-standard on purpose: it separates bugs from validation errors at a glance.
pub const UNHANDLED_STATUS: u16 = 499;

pub type AppResult<T> = Result<T, AppError>;

/// Errors produced while handling a request.
#[derive(Debug, Error)]
pub enum AppError {
    /// A declared domain error. `code` becomes the response status verbatim.
    #[error("{message}")]
    Custom {
        message: String,
        code: StatusCode,
        /// Value for `WWW-Authenticate` on 401 responses.
        challenge: Option<&'static str>,
    },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read request body: {0}")]
    Body(axum::Error),

    #[error("malformed multipart body: {0}")]
    Multipart(MultipartError),

    #[error("HTML rewriting failed: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to build response: {0}")]
    Http(#[from] axum::http::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn custom(message: impl Into<String>, code: StatusCode) -> Self {
        AppError::Custom {
            message: message.into(),
            code,
            challenge: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::custom(message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>, challenge: &'static str) -> Self {
        AppError::Custom {
            message: message.into(),
            code: StatusCode::UNAUTHORIZED,
            challenge: Some(challenge),
        }
    }

    pub fn payload_too_large() -> Self {
        Self::custom("Request body too large", StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// The status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Custom { code, .. } => *code,
            _ => StatusCode::from_u16(UNHANDLED_STATUS).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// True when the body limit layer cut the stream short somewhere in `err`'s chain.
fn exceeds_body_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(err), |e| e.source()).any(|e| e.is::<LengthLimitError>())
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        if exceeds_body_limit(&err) {
            AppError::payload_too_large()
        } else {
            AppError::Body(err)
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::payload_too_large()
        } else {
            AppError::Multipart(err)
        }
    }
}
