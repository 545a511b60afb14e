//! TCP listener setup.

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid bind address '{address}': {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Parse the configured bind address.
pub fn bind_address(config: &ListenerConfig) -> Result<SocketAddr, ListenerError> {
    config
        .bind_address
        .parse()
        .map_err(|source| ListenerError::Address {
            address: config.bind_address.clone(),
            source,
        })
}

/// Bind a plain TCP listener on the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr = bind_address(config)?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}
