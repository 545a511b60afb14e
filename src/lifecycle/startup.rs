//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the HTTP server (assets, outbound client, route table)
//! - Bind the listener, plain or TLS, and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Config is already loaded and validated by the caller

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::EdgebinConfig;
use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::net::{self, listener::bind_address, ListenerError};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),
}

/// Serve `config` until a termination signal arrives.
pub async fn run(config: EdgebinConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        strict_api = config.routing.strict_api,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let tls = config.listener.tls.clone();
    let listener_config = config.listener.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let rustls = net::load_tls_config(&tls)
                .await
                .map_err(StartupError::Tls)?;
            let addr = bind_address(&listener_config)?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = net::bind(&listener_config).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
