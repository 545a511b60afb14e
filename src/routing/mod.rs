//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → matcher.rs (split path into route name + positional args)
//!     → router.rs (route name → handler lookup)
//!     → Return: handler result, static asset, or 404
//!
//! Table Construction (at startup):
//!     handlers::standard_routes()
//!     → name → Arc<dyn Handler>
//!     → Freeze in AppState
//! ```
//!
//! # Design Decisions
//! - Table built once, immutable at runtime
//! - Literal, case-sensitive name match on the first segment only
//! - Unmatched names fall back to the asset store unless `strict_api` is set

pub mod matcher;
pub mod router;

pub use matcher::ParsedRoute;
pub use router::{Handler, HandlerFuture, RouteTable};
