//! match-router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ axum::serve
//!                          │
//!                          ▼
//!               ┌─────────────────────┐
//!               │ request id · trace  │
//!               │ headers · limits    │
//!               │ timeout             │
//!               └──────────┬──────────┘
//!                          ▼
//!               ┌─────────────────────┐
//!               │ forwarding service  │  every verb, every path
//!               └──────────┬──────────┘
//!                          ▼
//!               ┌─────────────────────┐
//!               │    match block      │  first match wins
//!               │ case 1 → handler    │
//!               │ case 2 → handler    │
//!               │ ...                 │
//!               │ else → 501          │
//!               └──────────┬──────────┘
//!                          ▼
//!               ┌─────────────────────┐
//!               │  book repository    │
//!               └─────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use match_router::config::{load_config, AppConfig};
use match_router::lifecycle;
use match_router::observability::logging;

#[derive(Parser)]
#[command(name = "match-router")]
#[command(about = "Expression-routed demo server", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("match-router v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
