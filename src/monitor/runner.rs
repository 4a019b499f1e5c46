//! Tick loop driving the reconciler against the Pushgateway.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::observability::metrics;
use crate::pushgateway::{GroupSink, PushgatewayResult, SnapshotSource};
use crate::reconcile::{Action, ObservedGroup, Reconciler};

/// Counts describing one completed tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Detectors held after the tick.
    pub tracked: usize,
    pub added: usize,
    pub removed: usize,
    pub skipped: usize,
    pub pushed: usize,
    pub deleted: usize,
    /// Push or delete calls the gateway rejected.
    pub failed_actions: usize,
}

/// Polls the gateway and reconciles group liveness every refresh period.
pub struct Monitor<G> {
    gateway: G,
    reconciler: Reconciler,
    bookkeeping: Vec<String>,
    refresh: Duration,
}

impl<G> Monitor<G>
where
    G: SnapshotSource + GroupSink,
{
    /// `bookkeeping` names the metrics that never count as heartbeats.
    pub fn new(gateway: G, reconciler: Reconciler, bookkeeping: Vec<String>, refresh: Duration) -> Self {
        Self {
            gateway,
            reconciler,
            bookkeeping,
            refresh,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Tick until a shutdown signal arrives. A started tick always completes.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            refresh_ms = self.refresh.as_millis() as u64,
            "Monitor starting"
        );

        let mut ticker = time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.run_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run a single tick at the current wall clock, logging a fetch failure.
    pub async fn run_once(&mut self) -> PushgatewayResult<TickSummary> {
        let result = self.run_tick(Utc::now()).await;
        match &result {
            Ok(summary) => {
                metrics::record_tick("ok");
                tracing::debug!(
                    tracked = summary.tracked,
                    pushed = summary.pushed,
                    deleted = summary.deleted,
                    failed = summary.failed_actions,
                    "Tick complete"
                );
            }
            Err(e) => {
                metrics::record_tick("fetch_error");
                tracing::warn!(error = %e, "Error querying metrics");
            }
        }
        result
    }

    /// Fetch, reconcile at `now`, and execute the resulting actions.
    ///
    /// A fetch failure returns early and leaves every detector untouched.
    pub async fn run_tick(&mut self, now: DateTime<Utc>) -> PushgatewayResult<TickSummary> {
        let groups = self.gateway.fetch_snapshot().await?;
        let observed: Vec<ObservedGroup> = groups
            .iter()
            .map(|group| group.observe(&self.bookkeeping))
            .collect();

        let report = self.reconciler.reconcile(&observed, now);

        for key in &report.added {
            tracing::info!(group = %key, "Group added");
        }
        if report.skipped > 0 {
            tracing::debug!(count = report.skipped, "Skipped groups with unexpected labels");
        }

        let mut summary = TickSummary {
            tracked: self.reconciler.len(),
            added: report.added.len(),
            removed: report.removed.len(),
            skipped: report.skipped,
            ..TickSummary::default()
        };

        for action in &report.actions {
            if self.execute(action).await {
                match action {
                    Action::Push { .. } => summary.pushed += 1,
                    Action::Delete { .. } => summary.deleted += 1,
                }
            } else {
                summary.failed_actions += 1;
            }
        }

        for key in &report.removed {
            tracing::info!(group = %key, "Group removed");
        }

        let expired = report
            .actions
            .iter()
            .filter(|action| matches!(action, Action::Delete { .. }))
            .count();
        metrics::record_group_events("added", report.added.len());
        metrics::record_group_events("expired", expired);
        metrics::record_group_events("removed", report.removed.len());
        metrics::record_group_events("skipped", report.skipped);
        metrics::record_tracked_groups(summary.tracked);

        Ok(summary)
    }

    /// Perform one action; failures are logged and reported as `false`.
    async fn execute(&self, action: &Action) -> bool {
        match action {
            Action::Push { key, up } => {
                if *up {
                    tracing::info!(group = %key, "Group up");
                } else {
                    tracing::info!(group = %key, "Group down");
                }
                metrics::record_transition(*up);
                match self.gateway.push_up(key, *up).await {
                    Ok(()) => true,
                    Err(e) => {
                        metrics::record_sink_error("push");
                        tracing::warn!(group = %key, error = %e, "Error upsetting group");
                        false
                    }
                }
            }
            Action::Delete { key } => {
                tracing::info!(group = %key, "Group expired");
                match self.gateway.delete_group(key).await {
                    Ok(()) => true,
                    Err(e) => {
                        metrics::record_sink_error("delete");
                        tracing::warn!(group = %key, error = %e, "Error deleting group");
                        false
                    }
                }
            }
        }
    }
}
