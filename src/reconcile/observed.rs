//! Typed snapshot items consumed by the reconciler.

use chrono::{DateTime, Utc};

use crate::liveness::Labels;

/// One group as reported by the metrics source in a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedGroup {
    pub labels: Labels,
    /// Oldest timestamp among the heartbeat-bearing metrics.
    pub heartbeat: Option<DateTime<Utc>>,
    /// Newest timestamp among all metrics of the group.
    pub last_activity: Option<DateTime<Utc>>,
}

/// Required label-name set of a tracked group: the primary label plus
/// exactly one distinguishing label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelShape {
    pub primary: String,
    pub instance: String,
}

impl LabelShape {
    pub fn new(primary: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            instance: instance.into(),
        }
    }

    /// Strict equality of the label-name set, not a subset check.
    pub fn matches(&self, labels: &Labels) -> bool {
        labels.len() == 2
            && labels.contains_key(&self.primary)
            && labels.contains_key(&self.instance)
    }
}

impl Default for LabelShape {
    fn default() -> Self {
        Self::new("job", "instance")
    }
}
