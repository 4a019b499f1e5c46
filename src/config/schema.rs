//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every section falls back to defaults, so an empty file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration::{parse_duration, DurationError};
use crate::reconcile::LabelShape;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UpsetterConfig {
    /// Gateway location and client settings.
    pub pushgateway: PushgatewayConfig,

    /// Tick period and group retention.
    pub polling: PollingConfig,

    /// Which groups are tracked and which metrics carry heartbeats.
    pub groups: GroupsConfig,

    /// Logging and metrics exporter settings.
    pub observability: ObservabilityConfig,
}

/// Pushgateway client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PushgatewayConfig {
    /// Base URL (e.g., "http://localhost:9091").
    pub url: String,

    /// Per-request timeout (e.g., "10s").
    pub timeout: String,
}

impl Default for PushgatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9091".to_string(),
            timeout: "10s".to_string(),
        }
    }
}

impl PushgatewayConfig {
    pub fn request_timeout(&self) -> Result<Duration, DurationError> {
        parse_duration(&self.timeout)
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    /// Period between two ticks (e.g., "20s").
    pub refresh: String,

    /// Maximum staleness before a group is deleted (e.g., "24h").
    /// Empty or "0" disables expiry.
    pub ttl: String,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh: "20s".to_string(),
            ttl: "24h".to_string(),
        }
    }
}

impl PollingConfig {
    pub fn refresh_period(&self) -> Result<Duration, DurationError> {
        parse_duration(&self.refresh)
    }

    /// Retention window, `None` when expiry is disabled.
    pub fn retention(&self) -> Result<Option<Duration>, DurationError> {
        if self.ttl.trim().is_empty() {
            return Ok(None);
        }
        let ttl = parse_duration(&self.ttl)?;
        Ok((!ttl.is_zero()).then_some(ttl))
    }
}

/// Group selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GroupsConfig {
    /// Label every key starts with.
    pub primary_label: String,

    /// The single other label a tracked group must carry.
    pub instance_label: String,

    /// Metrics excluded from the heartbeat timestamp.
    pub bookkeeping_metrics: Vec<String>,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            primary_label: "job".to_string(),
            instance_label: "instance".to_string(),
            bookkeeping_metrics: vec![
                "up".to_string(),
                "push_time_seconds".to_string(),
                "push_failure_time_seconds".to_string(),
            ],
        }
    }
}

impl GroupsConfig {
    pub fn label_shape(&self) -> LabelShape {
        LabelShape::new(&self.primary_label, &self.instance_label)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9899".to_string(),
        }
    }
}
