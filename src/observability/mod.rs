//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor ticks produce:
//!     → logging.rs (structured log events, one per group transition)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every group event carries the group key as a `group` field
//! - Metrics are cheap (atomic increments) and disabled by default

pub mod logging;
pub mod metrics;
