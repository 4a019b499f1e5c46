//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse duration strings and URLs ahead of startup
//! - Check the label shape is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: UpsetterConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::UpsetterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &UpsetterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.pushgateway.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "pushgateway.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("pushgateway.url", e.to_string())),
    }

    match config.pushgateway.request_timeout() {
        Ok(timeout) if timeout.is_zero() => {
            errors.push(ValidationError::new("pushgateway.timeout", "must be greater than zero"))
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("pushgateway.timeout", e.to_string())),
    }

    match config.polling.refresh_period() {
        Ok(refresh) if refresh.is_zero() => {
            errors.push(ValidationError::new("polling.refresh", "must be greater than zero"))
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("polling.refresh", e.to_string())),
    }

    if let Err(e) = config.polling.retention() {
        errors.push(ValidationError::new("polling.ttl", e.to_string()));
    }

    let groups = &config.groups;
    if groups.primary_label.trim().is_empty() {
        errors.push(ValidationError::new("groups.primary_label", "must not be empty"));
    }
    if groups.instance_label.trim().is_empty() {
        errors.push(ValidationError::new("groups.instance_label", "must not be empty"));
    }
    if groups.primary_label == groups.instance_label {
        errors.push(ValidationError::new(
            "groups.instance_label",
            "must differ from groups.primary_label",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&UpsetterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = UpsetterConfig::default();
        config.pushgateway.url = "ftp://gateway".to_string();
        config.polling.refresh = "0s".to_string();
        config.polling.ttl = "forever".to_string();
        config.groups.instance_label = "job".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["pushgateway.url", "polling.refresh", "polling.ttl", "groups.instance_label"]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = UpsetterConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
