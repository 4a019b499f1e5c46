//! Group identity derived from a label set.
//!
//! The key doubles as the grouping path of the Pushgateway URL:
//! `<primary>/<value>/<name>/<value>/...` with the primary label first and
//! the remaining labels sorted by name.

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use thiserror::Error;

/// Label name to value mapping of a group.
pub type Labels = BTreeMap<String, String>;

/// Errors raised while deriving a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("missing primary label '{0}'")]
    MissingPrimary(String),
}

/// Stable identity of a group of metrics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(String);

impl GroupKey {
    /// Derive the key for `labels`, leading with the `primary` label.
    ///
    /// Values that are empty, `.` or `..`, or that contain anything besides
    /// ASCII alphanumerics and `-._~:`, use the `name@base64/<value>` form.
    /// No two label sets share a key and every segment is path-safe.
    pub fn derive(primary: &str, labels: &Labels) -> Result<Self, KeyError> {
        let primary_value = labels
            .get(primary)
            .ok_or_else(|| KeyError::MissingPrimary(primary.to_string()))?;

        let mut parts = Vec::with_capacity(labels.len() * 2);
        push_pair(&mut parts, primary, primary_value);

        // BTreeMap iterates in name order.
        for (name, value) in labels.iter().filter(|(name, _)| *name != primary) {
            push_pair(&mut parts, name, value);
        }

        Ok(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the key leads with the given primary label name.
    pub fn starts_with_label(&self, primary: &str) -> bool {
        self.0
            .strip_prefix(primary)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with("@base64/"))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

fn is_path_safe(value: &str) -> bool {
    !matches!(value, "" | "." | "..")
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b':'))
}

fn push_pair(parts: &mut Vec<String>, name: &str, value: &str) {
    if value.is_empty() {
        parts.push(format!("{name}@base64"));
        parts.push("=".to_string());
    } else if !is_path_safe(value) {
        parts.push(format!("{name}@base64"));
        parts.push(URL_SAFE.encode(value));
    } else {
        parts.push(name.to_string());
        parts.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_primary_label_leads() {
        let key = GroupKey::derive("job", &labels(&[("instance", "bar"), ("job", "foo")])).unwrap();
        assert_eq!(key.as_str(), "job/foo/instance/bar");
    }

    #[test]
    fn test_other_labels_sorted() {
        let key = GroupKey::derive(
            "job",
            &labels(&[("zone", "eu"), ("job", "backup"), ("instance", "db1"), ("env", "prod")]),
        )
        .unwrap();
        assert_eq!(key.as_str(), "job/backup/env/prod/instance/db1/zone/eu");
    }

    #[test]
    fn test_order_independent() {
        let a = labels(&[("job", "foo"), ("instance", "bar"), ("env", "prod")]);
        let b = labels(&[("env", "prod"), ("instance", "bar"), ("job", "foo")]);
        assert_eq!(
            GroupKey::derive("job", &a).unwrap(),
            GroupKey::derive("job", &b).unwrap()
        );
    }

    #[test]
    fn test_different_values_differ() {
        let a = labels(&[("job", "foo"), ("instance", "bar")]);
        let b = labels(&[("job", "foo"), ("instance", "baz")]);
        assert_ne!(
            GroupKey::derive("job", &a).unwrap(),
            GroupKey::derive("job", &b).unwrap()
        );
    }

    #[test]
    fn test_missing_primary() {
        let err = GroupKey::derive("job", &labels(&[("instance", "bar")])).unwrap_err();
        assert_eq!(err, KeyError::MissingPrimary("job".to_string()));
    }

    #[test]
    fn test_slash_and_empty_values_are_encoded() {
        let key = GroupKey::derive("job", &labels(&[("job", "a/b"), ("instance", "")])).unwrap();
        assert_eq!(key.as_str(), "job@base64/YS9i/instance@base64/=");

        // Without encoding these two label sets would collide.
        let left = GroupKey::derive("job", &labels(&[("job", "x"), ("path", "a/b")])).unwrap();
        let right = GroupKey::derive("job", &labels(&[("job", "x"), ("path", "a")])).unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn test_unsafe_path_values_are_encoded() {
        let key = |value: &str| {
            GroupKey::derive("job", &labels(&[("job", "backup"), ("instance", value)]))
                .unwrap()
                .as_str()
                .to_string()
        };
        assert_eq!(key("a?b"), "job/backup/instance@base64/YT9i");
        assert_eq!(key("a#b"), "job/backup/instance@base64/YSNi");
        assert_eq!(key(".."), "job/backup/instance@base64/Li4=");
        assert_eq!(key("."), "job/backup/instance@base64/Lg==");
        assert_eq!(key("db1.example:9100"), "job/backup/instance/db1.example:9100");
    }

    #[test]
    fn test_starts_with_label() {
        assert!(GroupKey::from("job/test").starts_with_label("job"));
        assert!(GroupKey::from("job@base64/YS9i").starts_with_label("job"));
        assert!(!GroupKey::from("foo/bar").starts_with_label("job"));
        assert!(!GroupKey::from("jobs/bar").starts_with_label("job"));
    }
}
