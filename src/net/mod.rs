//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured bind address
//!     → listener.rs (parse + bind, plain TCP)
//!     → tls.rs (optional PEM cert/key, served via axum-server)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bind errors surface at startup, never per request
//! - TLS is optional and handled transparently

pub mod listener;
pub mod tls;

pub use listener::{bind, ListenerError};
pub use tls::load_tls_config;
