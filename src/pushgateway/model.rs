//! Query API data model.
//!
//! The Query API returns one object per group: a `labels` member plus one
//! member per metric family, each carrying the `time_stamp` of the push that
//! last wrote it. Members that are not objects (`last_push_successful`) are
//! ignored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::liveness::{GroupKey, KeyError, Labels};
use crate::pushgateway::error::{PushgatewayError, PushgatewayResult};
use crate::reconcile::ObservedGroup;

/// An individual metric family of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub timestamp: DateTime<Utc>,
}

/// Metric families of a group, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics(BTreeMap<String, Metric>);

impl Metrics {
    pub fn insert(&mut self, name: impl Into<String>, metric: Metric) {
        self.0.insert(name.into(), metric);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of the metrics with the given names removed.
    pub fn without<S: AsRef<str>>(&self, names: &[S]) -> Metrics {
        Metrics(
            self.0
                .iter()
                .filter(|(name, _)| !names.iter().any(|n| n.as_ref() == name.as_str()))
                .map(|(name, metric)| (name.clone(), *metric))
                .collect(),
        )
    }

    /// Oldest timestamp, or `None` when empty.
    pub fn min_timestamp(&self) -> Option<DateTime<Utc>> {
        self.0.values().map(|m| m.timestamp).min()
    }

    /// Newest timestamp, or `None` when empty.
    pub fn max_timestamp(&self) -> Option<DateTime<Utc>> {
        self.0.values().map(|m| m.timestamp).max()
    }
}

impl FromIterator<(String, Metric)> for Metrics {
    fn from_iter<I: IntoIterator<Item = (String, Metric)>>(iter: I) -> Self {
        Metrics(iter.into_iter().collect())
    }
}

/// A group of metrics from the Query API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsGroup {
    pub labels: Labels,
    pub metrics: Metrics,
}

impl MetricsGroup {
    /// Grouping key, usable as a Pushgateway URL path.
    pub fn key(&self, primary: &str) -> Result<GroupKey, KeyError> {
        GroupKey::derive(primary, &self.labels)
    }

    /// True if the label names are exactly `names`.
    pub fn label_names_match(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.labels.contains_key(*name)) && self.labels.len() == names.len()
    }

    /// Reduce to the reconciler's view.
    ///
    /// The heartbeat is the oldest metric outside `bookkeeping`: a group is
    /// only as fresh as its least recently pushed metric. Last activity is
    /// the newest of all metrics.
    pub fn observe<S: AsRef<str>>(&self, bookkeeping: &[S]) -> ObservedGroup {
        ObservedGroup {
            labels: self.labels.clone(),
            heartbeat: self.metrics.without(bookkeeping).min_timestamp(),
            last_activity: self.metrics.max_timestamp(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Vec<Map<String, Value>>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a Query API response body.
pub fn parse_query_response(body: &[u8]) -> PushgatewayResult<Vec<MetricsGroup>> {
    let response: QueryResponse = serde_json::from_slice(body)?;
    if response.status != "success" {
        let detail = match response.error {
            Some(error) => format!("{}: {}", response.status, error),
            None => response.status,
        };
        return Err(PushgatewayError::ApiStatus(detail));
    }

    response.data.iter().map(parse_group).collect()
}

fn parse_group(object: &Map<String, Value>) -> PushgatewayResult<MetricsGroup> {
    let mut group = MetricsGroup::default();
    for (name, value) in object {
        let Value::Object(member) = value else {
            continue;
        };
        if name == "labels" {
            group.labels = parse_labels(member)?;
        } else {
            group.metrics.insert(name.clone(), parse_metric(name, member)?);
        }
    }
    Ok(group)
}

fn parse_labels(object: &Map<String, Value>) -> PushgatewayResult<Labels> {
    object
        .iter()
        .map(|(name, value)| match value {
            Value::String(value) => Ok((name.clone(), value.clone())),
            other => Err(PushgatewayError::Malformed(format!(
                "label '{name}' is not a string: {other}"
            ))),
        })
        .collect()
}

fn parse_metric(name: &str, object: &Map<String, Value>) -> PushgatewayResult<Metric> {
    let raw = object
        .get("time_stamp")
        .and_then(Value::as_str)
        .ok_or_else(|| PushgatewayError::Malformed(format!("metric '{name}' has no time_stamp")))?;
    let timestamp = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| PushgatewayError::Malformed(format!("metric '{name}' time_stamp '{raw}': {e}")))?
        .with_timezone(&Utc);
    Ok(Metric { timestamp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn sample_group() -> (MetricsGroup, DateTime<Utc>) {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let labels = [("job", "foo"), ("instance", "bar")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let metrics = [
            ("baz", now),
            ("push_time_seconds", now + TimeDelta::seconds(1)),
            ("push_failure_time_seconds", now - TimeDelta::seconds(1)),
        ]
        .into_iter()
        .map(|(name, timestamp)| (name.to_string(), Metric { timestamp }))
        .collect();
        (MetricsGroup { labels, metrics }, now)
    }

    #[test]
    fn test_group_key_and_label_match() {
        let (group, _) = sample_group();
        assert_eq!(group.key("job").unwrap().as_str(), "job/foo/instance/bar");

        assert!(group.label_names_match(&["instance", "job"]));
        assert!(!group.label_names_match(&["job"]));
        assert!(!group.label_names_match(&["instance", "job", "qux"]));
    }

    #[test]
    fn test_min_and_max_timestamps() {
        let (group, now) = sample_group();
        let bookkeeping = ["push_time_seconds", "push_failure_time_seconds"];

        assert_eq!(group.metrics.min_timestamp(), Some(now - TimeDelta::seconds(1)));
        assert_eq!(group.metrics.max_timestamp(), Some(now + TimeDelta::seconds(1)));
        assert_eq!(group.metrics.without(&bookkeeping).min_timestamp(), Some(now));
        assert_eq!(group.metrics.without(&bookkeeping).max_timestamp(), Some(now));

        let nothing = group.metrics.without(&["baz", "push_time_seconds", "push_failure_time_seconds"]);
        assert!(nothing.is_empty());
        assert_eq!(nothing.min_timestamp(), None);
        assert_eq!(nothing.max_timestamp(), None);
    }

    #[test]
    fn test_observe_splits_heartbeat_and_activity() {
        let (group, now) = sample_group();
        let observed = group.observe(&["up", "push_time_seconds", "push_failure_time_seconds"]);

        assert_eq!(observed.heartbeat, Some(now));
        assert_eq!(observed.last_activity, Some(now + TimeDelta::seconds(1)));
        assert_eq!(observed.labels, group.labels);
    }

    #[test]
    fn test_parse_query_response() {
        let body = br#"{
            "status": "success",
            "data": [{
                "labels": {"job": "backup", "instance": "db1"},
                "last_push_successful": true,
                "backup_duration_seconds": {
                    "time_stamp": "2024-03-01T10:00:00Z",
                    "type": "GAUGE",
                    "metrics": [{"labels": {}, "value": "12"}]
                },
                "push_time_seconds": {"time_stamp": "2024-03-01T10:00:05+01:00", "type": "GAUGE"}
            }]
        }"#;

        let groups = parse_query_response(body).unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert!(group.label_names_match(&["job", "instance"]));
        assert_eq!(group.metrics.len(), 2);
        assert_eq!(
            group.metrics.min_timestamp(),
            Some(DateTime::parse_from_rfc3339("2024-03-01T09:00:05Z").unwrap().with_timezone(&Utc))
        );
    }

    #[test]
    fn test_parse_error_status() {
        let body = br#"{"status": "error", "errorType": "internal", "error": "boom"}"#;
        let err = parse_query_response(body).unwrap_err();
        assert!(matches!(err, PushgatewayError::ApiStatus(ref detail) if detail == "error: boom"));
    }

    #[test]
    fn test_parse_malformed_members() {
        let bad_label = br#"{"status": "success", "data": [{"labels": {"job": 1}}]}"#;
        assert!(matches!(
            parse_query_response(bad_label),
            Err(PushgatewayError::Malformed(_))
        ));

        let bad_timestamp =
            br#"{"status": "success", "data": [{"labels": {}, "m": {"time_stamp": "yesterday"}}]}"#;
        assert!(matches!(
            parse_query_response(bad_timestamp),
            Err(PushgatewayError::Malformed(_))
        ));

        let missing_timestamp = br#"{"status": "success", "data": [{"m": {"type": "GAUGE"}}]}"#;
        assert!(matches!(
            parse_query_response(missing_timestamp),
            Err(PushgatewayError::Malformed(_))
        ));

        assert!(matches!(
            parse_query_response(b"not json"),
            Err(PushgatewayError::Json(_))
        ));
    }
}
