use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

/// A remote project. Replaced wholesale on every poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// A task assignee as reported by the remote server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    pub id: i64,
    #[serde(default)]
    pub username: String,
}

/// A remote task.
///
/// Tasks are value objects: refreshed wholesale each cycle, never
/// patched in place across cycles. Updates show up as a new value under
/// the same id in the next snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, with = "rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default, with = "rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    /// Priority ordinal, 0 (unset) through 5 (urgent).
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Repeat interval in seconds, when the task recurs.
    #[serde(default)]
    pub repeat_after: Option<i64>,
    /// Remote repeat mode ordinal.
    #[serde(default)]
    pub repeat_mode: u8,
    /// Owning kanban bucket, present on tasks returned by a view
    /// listing. Stamped by the fetch pipeline when the remote omits it.
    #[serde(default)]
    pub bucket_id: Option<i64>,
}

/// One kanban bucket: an ordered task list within a view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub id: i64,
    pub tasks: Vec<Task>,
}

/// A bucket-organized view of one configured project.
///
/// Present in a snapshot only when both a kanban project id and view id
/// are configured and the view listing parsed cleanly this cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KanbanBoard {
    pub project_id: i64,
    pub view_id: i64,
    pub buckets: Vec<Bucket>,
    /// All bucket tasks flattened in bucket order, each carrying its
    /// owning `bucket_id`.
    pub tasks: Vec<Task>,
}

/// The immutable result of one successful fetch+filter cycle.
///
/// The coordinator holds at most one current snapshot, plus the
/// previous one transiently while diffing. Tasks map first-seen-wins
/// within a cycle; every task's `project_id` was accepted by the
/// selection policy at fetch time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub projects: BTreeMap<i64, Project>,
    pub tasks: BTreeMap<i64, Task>,
    pub kanban: Option<KanbanBoard>,
}
