//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a running monitor
//! - Start the optional metrics endpoint
//! - Hook OS signals to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use chrono::TimeDelta;
use thiserror::Error;

use crate::config::{DurationError, UpsetterConfig};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::monitor::Monitor;
use crate::observability::metrics;
use crate::pushgateway::{PushgatewayClient, PushgatewayError};
use crate::reconcile::Reconciler;

/// Errors that prevent the monitor from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid duration: {0}")]
    Duration(#[from] DurationError),

    #[error("retention window out of range")]
    RetentionRange,

    #[error("pushgateway client: {0}")]
    Client(#[from] PushgatewayError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Build the monitor described by `config`.
pub fn build_monitor(config: &UpsetterConfig) -> Result<Monitor<PushgatewayClient>, StartupError> {
    let client = PushgatewayClient::new(
        &config.pushgateway.url,
        &config.groups.primary_label,
        config.pushgateway.request_timeout()?,
    )?;

    let retention = config
        .polling
        .retention()?
        .map(|ttl| TimeDelta::from_std(ttl).map_err(|_| StartupError::RetentionRange))
        .transpose()?;
    let reconciler = Reconciler::new(config.groups.label_shape(), retention);

    Ok(Monitor::new(
        client,
        reconciler,
        config.groups.bookkeeping_metrics.clone(),
        config.polling.refresh_period()?,
    ))
}

/// Start the metrics endpoint if enabled.
pub fn start_metrics(config: &UpsetterConfig) -> Result<(), StartupError> {
    let observability = &config.observability;
    if !observability.metrics_enabled {
        return Ok(());
    }
    let addr = observability
        .metrics_address
        .parse()
        .map_err(|_| StartupError::MetricsAddress(observability.metrics_address.clone()))?;
    metrics::init_metrics(addr)?;
    Ok(())
}

/// Run until SIGINT/SIGTERM, or for a single tick when `once` is set.
pub async fn run(config: UpsetterConfig, once: bool) -> Result<(), StartupError> {
    let mut monitor = build_monitor(&config)?;

    tracing::info!(
        url = %monitor.gateway().base_url(),
        refresh = %config.polling.refresh,
        ttl = %config.polling.ttl,
        "Configuration loaded"
    );

    if once {
        monitor.run_once().await?;
        return Ok(());
    }

    start_metrics(&config)?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    monitor.run(receiver).await;
    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_monitor_from_defaults() {
        let monitor = build_monitor(&UpsetterConfig::default()).unwrap();
        assert_eq!(monitor.gateway().base_url().as_str(), "http://localhost:9091/");
        assert!(monitor.reconciler().is_empty());
    }

    #[tokio::test]
    async fn test_build_monitor_rejects_bad_duration() {
        let mut config = UpsetterConfig::default();
        config.pushgateway.timeout = "fast".to_string();
        assert!(matches!(build_monitor(&config), Err(StartupError::Duration(_))));
    }

    #[test]
    fn test_metrics_disabled_is_noop() {
        let mut config = UpsetterConfig::default();
        config.observability.metrics_address = "garbage".to_string();
        assert!(start_metrics(&config).is_ok());
    }
}
