//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Entry point + WebSocket sessions produce:
//!     → logging.rs (structured log events, EnvFilter)
//!     → metrics.rs (request counters, latency histogram, session counter)
//!
//! Consumers:
//!     → stdout (tracing fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Request ID (`x-request-id`) is attached by the HTTP layer, not here
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
