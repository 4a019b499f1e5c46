//! Polling monitor.
//!
//! # Responsibilities
//! - Drive one reconciliation per refresh period
//! - Fetch the snapshot, reconcile, execute the resulting actions
//! - Report failures without stopping the loop
//!
//! # Design Decisions
//! - Single task: a tick runs to completion before the next fetch
//! - A failed fetch aborts the tick with no state change; the next tick retries
//! - A failed push or delete is logged and never reverts the in-memory verdict

pub mod runner;

pub use runner::{Monitor, TickSummary};
