//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts, limits)
//! - Check that addresses, URLs and time zones parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgebinConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::EdgebinConfig;
use crate::handlers::dynamic::MAX_DELAY_SECS;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must exceed {min} seconds, got {actual}")]
    RequestTimeoutTooShort { min: u64, actual: u64 },

    #[error("timeouts.upstream_secs must be greater than zero")]
    ZeroUpstreamTimeout,

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.max_body_size must be greater than zero")]
    ZeroUpstreamBodyLimit,

    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("upstream.telegram_api_base must be an http(s) URL, got '{0}'")]
    InvalidTelegramBase(String),

    #[error("listener.tls requires both cert_path and key_path")]
    IncompleteTls,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &EdgebinConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() || tls.key_path.trim().is_empty() {
            errors.push(ValidationError::IncompleteTls);
        }
    }

    if config.timeouts.request_secs <= MAX_DELAY_SECS {
        errors.push(ValidationError::RequestTimeoutTooShort {
            min: MAX_DELAY_SECS,
            actual: config.timeouts.request_secs,
        });
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.upstream.max_body_size == 0 {
        errors.push(ValidationError::ZeroUpstreamBodyLimit);
    }

    if config
        .websocket
        .default_time_zone
        .parse::<chrono_tz::Tz>()
        .is_err()
    {
        errors.push(ValidationError::UnknownTimeZone(
            config.websocket.default_time_zone.clone(),
        ));
    }

    match url::Url::parse(&config.upstream.telegram_api_base) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidTelegramBase(
            config.upstream.telegram_api_base.clone(),
        )),
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
