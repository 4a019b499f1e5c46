//! Pushgateway liveness monitor.
//!
//! Polls a Prometheus Pushgateway, infers whether each job instance is alive
//! from the cadence of its pushes and writes an `up` metric back.

pub mod config;
pub mod liveness;
pub mod monitor;
pub mod pushgateway;
pub mod reconcile;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::UpsetterConfig;
pub use lifecycle::Shutdown;
pub use liveness::{GroupKey, LivenessDetector};
pub use monitor::Monitor;
pub use pushgateway::PushgatewayClient;
pub use reconcile::{Action, Reconciler};
