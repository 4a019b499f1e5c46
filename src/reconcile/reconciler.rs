//! Reconciliation of one poll against the tracked detectors.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::liveness::{GroupKey, LivenessDetector};
use crate::reconcile::observed::{LabelShape, ObservedGroup};

/// Side effect the sink must perform to converge external state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write the up indicator for the group.
    Push { key: GroupKey, up: bool },
    /// Remove the group from the aggregation endpoint.
    Delete { key: GroupKey },
}

impl Action {
    pub fn key(&self) -> &GroupKey {
        match self {
            Action::Push { key, .. } | Action::Delete { key } => key,
        }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Sink actions in the order they were decided.
    pub actions: Vec<Action>,
    /// Groups seen for the first time; tracked silently.
    pub added: Vec<GroupKey>,
    /// Groups no longer reported by the source; dropped locally only.
    pub removed: Vec<GroupKey>,
    /// Items whose label shape did not qualify them for tracking.
    pub skipped: usize,
}

/// Owns the key → detector map for the lifetime of the process.
#[derive(Debug)]
pub struct Reconciler {
    shape: LabelShape,
    retention: Option<TimeDelta>,
    groups: HashMap<GroupKey, LivenessDetector>,
}

impl Reconciler {
    /// `retention` of `None` disables the expiry check.
    pub fn new(shape: LabelShape, retention: Option<TimeDelta>) -> Self {
        Self {
            shape,
            retention,
            groups: HashMap::new(),
        }
    }

    pub fn shape(&self) -> &LabelShape {
        &self.shape
    }

    /// Apply one snapshot, evaluating verdicts at `now`.
    pub fn reconcile(&mut self, observed: &[ObservedGroup], now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let mut received = HashSet::with_capacity(observed.len());
        let cutoff = self.retention.and_then(|ttl| now.checked_sub_signed(ttl));

        for group in observed {
            if !self.shape.matches(&group.labels) {
                report.skipped += 1;
                continue;
            }
            // The shape check guarantees the primary label is present.
            let Ok(key) = GroupKey::derive(&self.shape.primary, &group.labels) else {
                report.skipped += 1;
                continue;
            };
            received.insert(key.clone());

            let Some(detector) = self.groups.get_mut(&key) else {
                self.groups.insert(key.clone(), LivenessDetector::new(group.heartbeat));
                report.added.push(key);
                continue;
            };

            if let Some(cutoff) = cutoff {
                // A group without any metric timestamp is as old as it gets.
                if group.last_activity.map_or(true, |seen| seen < cutoff) {
                    self.groups.remove(&key);
                    report.actions.push(Action::Delete { key });
                    continue;
                }
            }

            if detector.update_at(group.heartbeat, now) {
                let up = detector.verdict();
                report.actions.push(Action::Push { key, up });
            }
        }

        self.groups.retain(|key, _| {
            let keep = received.contains(key);
            if !keep {
                report.removed.push(key.clone());
            }
            keep
        });
        report.removed.sort();

        report
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn detector(&self, key: &GroupKey) -> Option<&LivenessDetector> {
        self.groups.get(key)
    }

    /// Verdict of every tracked group at `now`, sorted by key.
    pub fn verdicts(&self, now: DateTime<Utc>) -> Vec<(GroupKey, bool)> {
        let mut verdicts: Vec<_> = self
            .groups
            .iter()
            .map(|(key, detector)| (key.clone(), detector.is_up_at(now)))
            .collect();
        verdicts.sort();
        verdicts
    }
}
