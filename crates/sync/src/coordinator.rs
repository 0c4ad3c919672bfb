//! Poll coordinator: owns the current snapshot and drives the cycle.

use std::sync::Arc;
use std::time::Duration;

use taskmirror_core::config::SyncConfig;
use taskmirror_core::diff::{diff, SyncOutcome};
use taskmirror_core::error::FetchError;
use taskmirror_core::model::Snapshot;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info};

use crate::fetch::fetch_snapshot;
use crate::reconcile::{EntityRegistry, Reconciler};
use crate::remote::RemoteClient;

/// Hard deadline for one fetch cycle, in seconds.
pub const CYCLE_TIMEOUT_SECS: u64 = 10;

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No cycle has run yet.
    Idle,
    /// A cycle is in flight.
    Polling,
    /// The last cycle published a snapshot.
    Ready,
    /// The last cycle failed; the previous snapshot (if any) is still
    /// published.
    Failed,
}

/// Cloneable handle for requesting an out-of-band refresh.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Requests a refresh. Coalesces: while a request is already
    /// pending or a cycle is in flight, additional requests are
    /// dropped — there is never a queue of cycles.
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Owns the current snapshot for one remote connection and drives the
/// timed poll loop.
///
/// The coordinator is the sole writer of the published snapshot;
/// watchers only ever observe a fully-formed, immutable value.
pub struct Coordinator<C, R> {
    config: SyncConfig,
    client: C,
    reconciler: Reconciler<R>,
    scope_id: String,
    current: Option<Arc<Snapshot>>,
    status_tx: watch::Sender<SyncStatus>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    reload_tx: watch::Sender<u64>,
    refresh_tx: mpsc::Sender<()>,
    refresh_rx: mpsc::Receiver<()>,
}

impl<C, R> Coordinator<C, R>
where
    C: RemoteClient,
    R: EntityRegistry,
{
    pub fn new(config: SyncConfig, client: C, registry: R, scope_id: impl Into<String>) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        Self {
            config,
            client,
            reconciler: Reconciler::new(registry),
            scope_id: scope_id.into(),
            current: None,
            status_tx: watch::channel(SyncStatus::Idle).0,
            snapshot_tx: watch::channel(None).0,
            reload_tx: watch::channel(0).0,
            refresh_tx,
            refresh_rx,
        }
    }

    /// Watch the published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// Watch the downstream reload generation counter. Multiple fires
    /// before consumption collapse into one observed change.
    pub fn reload_signal(&self) -> watch::Receiver<u64> {
        self.reload_tx.subscribe()
    }

    /// Watch the coordinator state machine.
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Handle for requesting refreshes from other tasks.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.refresh_tx.clone(),
        }
    }

    /// Runs one cycle immediately and propagates its failure.
    ///
    /// This is the setup path: the very first refresh must fail loudly
    /// so external setup that depends on the first snapshot can bail.
    pub async fn refresh(&mut self) -> Result<Arc<Snapshot>, FetchError> {
        self.run_cycle().await
    }

    /// Drives the timed poll loop until the surrounding task is
    /// cancelled.
    ///
    /// Scheduled cycle failures are logged and retried on the next
    /// interval; the loop never gives up after one failure. A refresh
    /// request arriving while a cycle is in flight is answered by that
    /// cycle's published snapshot and dropped.
    pub async fn run(&mut self) {
        let mut tick = interval(Duration::from_secs(self.config.interval_secs.max(1)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick fires immediately; the caller already
        // ran the initial refresh.
        tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = self.refresh_rx.recv() => {}
            }
            if let Err(e) = self.run_cycle().await {
                error!(scope = %self.scope_id, error = %e, "poll cycle failed; retrying next interval");
            }
            // Requests that piled up while the cycle ran are satisfied
            // by the snapshot just published.
            while self.refresh_rx.try_recv().is_ok() {}
            tick.reset();
        }
    }

    async fn run_cycle(&mut self) -> Result<Arc<Snapshot>, FetchError> {
        self.status_tx.send_replace(SyncStatus::Polling);

        let deadline = Duration::from_secs(CYCLE_TIMEOUT_SECS);
        let fetched = match timeout(deadline, fetch_snapshot(&self.config, &self.client)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                secs: CYCLE_TIMEOUT_SECS,
            }),
        };

        let next = match fetched {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                // The previous snapshot stays published untouched.
                self.status_tx.send_replace(SyncStatus::Failed);
                return Err(e);
            }
        };

        let outcome = diff(self.current.as_deref(), &next);
        self.apply_side_effects(&outcome);

        self.current = Some(Arc::clone(&next));
        self.snapshot_tx.send_replace(Some(Arc::clone(&next)));
        self.status_tx.send_replace(SyncStatus::Ready);
        info!(
            scope = %self.scope_id,
            projects = next.projects.len(),
            tasks = next.tasks.len(),
            kanban = next.kanban.is_some(),
            "published snapshot"
        );
        Ok(next)
    }

    fn apply_side_effects(&self, outcome: &SyncOutcome) {
        if !outcome.had_prior_snapshot {
            return;
        }
        if outcome.has_additions() {
            info!(
                scope = %self.scope_id,
                projects = outcome.added_project_ids.len(),
                tasks = outcome.added_task_ids.len(),
                "new items detected; signalling downstream reload"
            );
            self.reload_tx.send_modify(|generation| *generation += 1);
        }
        // Task removals strictly before project removals: task
        // representations are scoped under their project downstream.
        for task_id in &outcome.removed_task_ids {
            self.reconciler.remove_task(&self.scope_id, *task_id);
        }
        for project_id in &outcome.removed_project_ids {
            self.reconciler.remove_project(&self.scope_id, *project_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_requests_coalesce() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = RefreshHandle { tx };
        handle.request();
        handle.request();
        handle.request();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
