//! Offline-capable HTTP caching gateway.
//!
//! Fronts a single origin server and applies a per-request routing policy:
//! realtime and mutating traffic passes through untouched, API traffic is
//! always fetched fresh, page navigations are network-first with a cached
//! fallback, and static assets are cache-first with opportunistic populate.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                CACHING GATEWAY                 │
//!                    │                                                │
//!   Client Request   │  ┌─────────┐    ┌────────────┐                │
//!   ─────────────────┼─▶│  http   │───▶│  routing   │ classify       │
//!                    │  │ server  │    │ classifier │ (pure)         │
//!                    │  └─────────┘    └─────┬──────┘                │
//!                    │                       │ strategy              │
//!                    │                       ▼                       │
//!                    │               ┌──────────────┐   ┌─────────┐  │
//!                    │               │ cache router │◀─▶│  cache  │  │
//!                    │               │  (strategy   │   │  store  │  │
//!                    │               │  execution)  │   └─────────┘  │
//!                    │               └──────┬───────┘                │
//!   Client Response  │                      │                        │
//!   ◀────────────────┼──────────────────────┼───────────────┐        │
//!                    │                      ▼               │        │
//!                    │               ┌──────────────┐       │        │
//!                    │               │   upstream   │───────┘        │
//!                    │               │    client    │◀───────────────┼── Origin
//!                    │               └──────────────┘                │   Server
//!                    │                                               │
//!                    │  config · lifecycle (install/activate) ·      │
//!                    │  observability (tracing, metrics)             │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cachegate::config::{loader, GatewayConfig};
use cachegate::lifecycle::startup;
use cachegate::observability::logging;

#[derive(Parser)]
#[command(name = "cachegate")]
#[command(about = "Offline-capable HTTP caching gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "cachegate.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        match loader::load_config(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {}: {}", cli.config.display(), e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        GatewayConfig::default()
    };

    logging::init(&config.observability.log_filter);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        version = %config.cache.version,
        "cachegate starting"
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            // An install failure lands here: the new version never went
            // live, and the exit code tells the deploy tooling to keep the
            // previous one running.
            tracing::error!(error = %e, "Gateway exited with error");
            ExitCode::FAILURE
        }
    }
}
