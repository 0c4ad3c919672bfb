//! Snapshot diff engine.

use std::collections::BTreeSet;

use crate::model::Snapshot;

/// Identifier-level difference between two consecutive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added_project_ids: BTreeSet<i64>,
    pub removed_project_ids: BTreeSet<i64>,
    pub added_task_ids: BTreeSet<i64>,
    pub removed_task_ids: BTreeSet<i64>,
    /// Whether a previous snapshot existed at all. The first successful
    /// fetch must not trigger reload or removal side effects.
    pub had_prior_snapshot: bool,
}

impl SyncOutcome {
    /// True when any project or task appeared this cycle.
    pub fn has_additions(&self) -> bool {
        !self.added_project_ids.is_empty() || !self.added_task_ids.is_empty()
    }

    /// True when any project or task disappeared this cycle.
    pub fn has_removals(&self) -> bool {
        !self.removed_project_ids.is_empty() || !self.removed_task_ids.is_empty()
    }
}

/// Compares `next` against the previously published snapshot.
///
/// An absent `previous` models the first successful fetch: all sets are
/// empty and `had_prior_snapshot` is false.
pub fn diff(previous: Option<&Snapshot>, next: &Snapshot) -> SyncOutcome {
    let Some(prev) = previous else {
        return SyncOutcome::default();
    };

    let prev_projects: BTreeSet<i64> = prev.projects.keys().copied().collect();
    let next_projects: BTreeSet<i64> = next.projects.keys().copied().collect();
    let prev_tasks: BTreeSet<i64> = prev.tasks.keys().copied().collect();
    let next_tasks: BTreeSet<i64> = next.tasks.keys().copied().collect();

    SyncOutcome {
        added_project_ids: next_projects.difference(&prev_projects).copied().collect(),
        removed_project_ids: prev_projects.difference(&next_projects).copied().collect(),
        added_task_ids: next_tasks.difference(&prev_tasks).copied().collect(),
        removed_task_ids: prev_tasks.difference(&next_tasks).copied().collect(),
        had_prior_snapshot: true,
    }
}
