//! Per-tick reconciliation of observed groups against tracked detectors.
//!
//! # Data Flow
//! ```text
//! Snapshot of observed groups
//!     → observed.rs (shape check)
//!     → reconciler.rs
//!         new group      → create detector, no action
//!         stale group    → drop detector, Delete action
//!         known group    → update detector, Push action on change
//!         vanished group → drop detector, no action
//!     → TickReport (actions for the sink + bookkeeping for logs)
//! ```
//!
//! # Design Decisions
//! - The detector map is owned by one Reconciler; no locking
//! - Heartbeat freshness uses the minimum timestamp, expiry the maximum
//! - In-memory verdicts are authoritative even if a push fails

pub mod observed;
pub mod reconciler;

pub use observed::{LabelShape, ObservedGroup};
pub use reconciler::{Action, Reconciler, TickReport};
