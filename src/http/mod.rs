//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/cors.rs (preflight, CORS headers)
//!     → request.rs (absolute URL, route, query, client/geo)
//!     → [routing table picks handler]
//!     → body.rs / params.rs (input normalization)
//!     → upstream.rs (bounded reads of fetched bodies)
//!     → error.rs + response.rs (error translation, response builders)
//!     → Send to client
//! ```

pub mod body;
pub mod error;
pub mod middleware;
pub mod params;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;
pub mod websocket;

pub use error::{AppError, AppResult};
pub use request::RouteRequest;
pub use server::{AppState, HttpServer};
