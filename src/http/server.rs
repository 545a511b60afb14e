//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the single catch-all entry point
//! - Wire up middleware (tracing, timeouts, body limit, request ID, CORS)
//! - Build shared state (config, assets, outbound client, route table)
//! - Translate handler errors and record metrics once per request
//! - Serve plain TCP or TLS with graceful shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::assets::{AssetStore, MemoryAssetStore};
use crate::config::EdgebinConfig;
use crate::handlers;
use crate::http::middleware::{cors, request_id};
use crate::http::request::RouteRequest;
use crate::http::response::error_response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::router::{dispatch, RouteTable};

/// Grace period for in-flight TLS connections after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build outbound HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to load assets from {dir}: {source}")]
    Assets {
        dir: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EdgebinConfig>,
    pub assets: Arc<dyn AssetStore>,
    /// Shared outbound client for markdown sources, page-meta and Telegram.
    pub client: reqwest::Client,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// State with the standard route table.
    pub fn new(config: EdgebinConfig, assets: Arc<dyn AssetStore>) -> Result<Self, ServerError> {
        Self::with_routes(config, assets, handlers::standard_routes())
    }

    pub fn with_routes(
        config: EdgebinConfig,
        assets: Arc<dyn AssetStore>,
        routes: RouteTable,
    ) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .user_agent(config.upstream.user_agent.clone())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            assets,
            client,
            routes: Arc::new(routes),
        })
    }
}

/// HTTP server for edgebin.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server with the built-in assets, overlaid from `assets.dir` if set.
    pub fn new(config: EdgebinConfig) -> Result<Self, ServerError> {
        let mut store = MemoryAssetStore::builtin();
        if let Some(dir) = &config.assets.dir {
            store.overlay_dir(dir).map_err(|source| ServerError::Assets {
                dir: dir.display().to_string(),
                source,
            })?;
        }
        Self::with_assets(config, Arc::new(store))
    }

    /// Create a server over an arbitrary asset store.
    pub fn with_assets(
        config: EdgebinConfig,
        assets: Arc<dyn AssetStore>,
    ) -> Result<Self, ServerError> {
        let state = AppState::new(config, assets)?;
        let config = Arc::clone(&state.config);
        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgebinConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(entry))
            .route("/", any(entry))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(cors::decorate))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(middleware::from_fn(request_id::mark_client_id))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: axum_server::tls_rustls::RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Single entry point for every path.
async fn entry(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    request_id::strip_generated(&mut request);
    let req = RouteRequest::new(request);
    let url = req.url.clone();
    let label = state.routes.label(&req.route);

    let response = match dispatch(state, req).await {
        Ok(response) => response,
        Err(err) => error_response(err, &url),
    };

    metrics::record_request(label, response.status().as_u16(), start);
    response
}
