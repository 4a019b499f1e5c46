//! Prometheus Pushgateway access.
//!
//! # Responsibilities
//! - Read all metric groups through the Query API
//! - Write the `up` indicator of a group
//! - Delete a group
//!
//! # Data Flow
//! ```text
//! GET /api/v1/metrics
//!     → model.rs (JSON → MetricsGroup)
//!     → MetricsGroup::observe → ObservedGroup (reconciler input)
//!
//! Action::Push   → POST/PUT /metrics/<key>  ("up 1" / "up 0")
//! Action::Delete → DELETE   /metrics/<key>
//! ```

use std::future::Future;

use crate::liveness::GroupKey;

pub mod client;
pub mod error;
pub mod model;

pub use client::PushgatewayClient;
pub use error::{PushgatewayError, PushgatewayResult};
pub use model::{Metric, Metrics, MetricsGroup};

/// Source of the per-tick group snapshot.
pub trait SnapshotSource {
    fn fetch_snapshot(&self) -> impl Future<Output = PushgatewayResult<Vec<MetricsGroup>>> + Send;
}

/// Executes the actions decided by the reconciler.
pub trait GroupSink {
    fn push_up(&self, key: &GroupKey, up: bool) -> impl Future<Output = PushgatewayResult<()>> + Send;

    fn delete_group(&self, key: &GroupKey) -> impl Future<Output = PushgatewayResult<()>> + Send;
}
