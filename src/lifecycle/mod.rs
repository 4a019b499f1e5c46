//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build client + reconciler → Metrics endpoint → Monitor loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Current tick finishes → Loop exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then client, then the loop
//! - No state survives a restart; detectors are rebuilt from the first poll

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
