//! OS signal handling.
//!
//! # Responsibilities
//! - Translate Ctrl+C into a shutdown trigger
//!
//! # Design Decisions
//! - Signals only trigger the coordinator; subsystems decide how to drain

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers shutdown on Ctrl+C.
pub fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });
}
