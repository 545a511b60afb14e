//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for edgebin.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgebinConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Dispatch behaviour for unmatched paths.
    pub routing: RoutingConfig,

    /// Static asset overrides.
    pub assets: AssetsConfig,

    /// Outbound fetch settings.
    pub upstream: UpstreamConfig,

    /// WebSocket echo settings.
    pub websocket: WebSocketConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must stay above the `/delay` cap.
    pub request_secs: u64,

    /// Timeout for outbound fetches in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 15,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// When set, unknown routes answer 404 JSON instead of falling back
    /// to the asset store.
    pub strict_api: bool,
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory whose files override the built-in assets.
    pub dir: Option<PathBuf>,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// User-Agent sent when fetching markdown sources.
    pub user_agent: String,

    /// Base URL of the Telegram Bot API.
    pub telegram_api_base: String,

    /// Most bytes read from a fetched page, markdown source or Telegram reply.
    pub max_body_size: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("edgebin/{}", env!("CARGO_PKG_VERSION")),
            telegram_api_base: "https://api.telegram.org".to_string(),
            max_body_size: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Time zone used for the `date` command when the client's is unknown.
    pub default_time_zone: String,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            default_time_zone: "Asia/Shanghai".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
