//! Liveness inference subsystem.
//!
//! # Data Flow
//! ```text
//! Label set of a group
//!     → key.rs (derive a stable GroupKey)
//!
//! Heartbeat timestamp of a group
//!     → detector.rs (adapt timeout, recompute verdict)
//!     → changed? → caller pushes the new verdict
//! ```
//!
//! # Design Decisions
//! - No global timeout: each group's grace window is 1.5x its most recent
//!   heartbeat interval
//! - Only the two most recent heartbeats matter
//! - The first observation never yields a verdict change

pub mod detector;
pub mod key;

pub use detector::LivenessDetector;
pub use key::{GroupKey, KeyError, Labels};
