//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Install (precache manifest, all-or-nothing)
//!     → Activate (evict stale namespaces) → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Install precedes activation precedes serving; a version never serves
//!   with a partially populated namespace
//! - Shutdown has no special cache handling: namespaces are in-memory and
//!   the next deploy reinstalls its manifest

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
