//! edgebin: echo, inspect and transform HTTP requests.

pub mod assets;
pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use assets::{AssetStore, MemoryAssetStore};
pub use config::EdgebinConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
