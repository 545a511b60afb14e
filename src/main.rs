//! edgebin: an httpbin-style diagnostic HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                        EDGEBIN                           │
//!                 │                                                          │
//!  Client ───────▶│  ┌─────────┐   ┌──────────────┐   ┌──────────────────┐   │
//!                 │  │   net   │──▶│ http server  │──▶│ routing dispatch │   │
//!                 │  │listener │   │ + middleware │   │  (route table)   │   │
//!                 │  └─────────┘   └──────┬───────┘   └────────┬─────────┘   │
//!                 │                       │                    ▼             │
//!  Client ◀───────│── CORS + error ◀──────┘           ┌──────────────────┐   │
//!                 │   translation                     │ handlers / assets│──▶│── Upstream
//!                 │                                   └──────────────────┘   │  (fetch, Telegram)
//!                 │                                                          │
//!                 │  config · observability · lifecycle                      │
//!                 └──────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use edgebin::config::{loader, validation, EdgebinConfig};
use edgebin::lifecycle;
use edgebin::observability::logging;

#[derive(Parser)]
#[command(name = "edgebin")]
#[command(about = "httpbin-style diagnostic HTTP service", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `assets.dir`
    #[arg(short, long)]
    assets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => EdgebinConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(dir) = cli.assets {
        config.assets.dir = Some(dir);
    }
    validation::validate_config(&config).map_err(loader::ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "edgebin starting"
    );

    lifecycle::run(config).await?;
    Ok(())
}
