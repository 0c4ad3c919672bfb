//! One full pull cycle: enumerate, filter, assemble a snapshot.

use serde_json::Value;
use taskmirror_core::config::SyncConfig;
use taskmirror_core::error::FetchError;
use taskmirror_core::model::{Bucket, KanbanBoard, Snapshot, Task};
use taskmirror_core::policy;
use tracing::{debug, info, warn};

use crate::remote::RemoteClient;

/// Runs one fetch cycle against the remote server and returns the next
/// snapshot.
///
/// Any transport failure aborts the whole cycle; no partial snapshot is
/// ever returned. A malformed kanban payload only degrades the kanban
/// board to absent.
pub async fn fetch_snapshot(
    config: &SyncConfig,
    client: &dyn RemoteClient,
) -> Result<Snapshot, FetchError> {
    let all_projects = client.list_projects().await?;
    info!(total = all_projects.len(), "fetched remote project list");

    let selected: Vec<_> = all_projects
        .into_iter()
        .filter(|p| policy::is_project_selected(p.id, config))
        .collect();
    info!(selected = selected.len(), "syncing selected projects");

    let mut snapshot = Snapshot::default();
    for project in selected {
        let tasks = client.list_tasks(project.id).await?;
        debug!(project = project.id, count = tasks.len(), "fetched tasks");
        for task in tasks {
            if policy::is_task_hidden(&task, config) {
                continue;
            }
            // A listing can hand back tasks owned by another project
            // (shared views, subprojects). Out-of-scope owners never
            // make it into the snapshot.
            if !policy::is_project_selected(task.project_id, config) {
                debug!(
                    task = task.id,
                    owner = task.project_id,
                    listed_under = project.id,
                    "task owned by unselected project dropped"
                );
                continue;
            }
            // First match per cycle wins; the remote may hand the same
            // task back under more than one project query.
            if let Some(existing) = snapshot.tasks.get(&task.id) {
                debug!(
                    task = task.id,
                    kept_project = existing.project_id,
                    shadowed_project = task.project_id,
                    "duplicate task id across project fetches"
                );
                continue;
            }
            snapshot.tasks.insert(task.id, task);
        }
        snapshot.projects.insert(project.id, project);
    }

    if let Some((project_id, view_id)) = policy::resolve_kanban_target(config) {
        let path = format!("/projects/{project_id}/views/{view_id}/tasks");
        let payload = client.raw_request("GET", &path).await?;
        snapshot.kanban = parse_kanban(config, project_id, view_id, &payload);
    }

    Ok(snapshot)
}

/// Parses the bucketed view listing into a [`KanbanBoard`].
///
/// The endpoint answers either `{"data": [bucket, ...]}` or a bare
/// bucket array depending on the server version. Anything else is
/// treated as an absent board for this cycle, never as a cycle failure.
fn parse_kanban(
    config: &SyncConfig,
    project_id: i64,
    view_id: i64,
    payload: &Value,
) -> Option<KanbanBoard> {
    let raw_buckets = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                warn!(
                    project = project_id,
                    view = view_id,
                    "kanban response has no bucket list; skipping board this cycle"
                );
                return None;
            }
        },
        _ => {
            warn!(
                project = project_id,
                view = view_id,
                "kanban response is not an object or array; skipping board this cycle"
            );
            return None;
        }
    };

    let mut buckets = Vec::with_capacity(raw_buckets.len());
    for raw in raw_buckets {
        let Some(bucket_id) = raw.get("id").and_then(Value::as_i64) else {
            warn!(
                project = project_id,
                view = view_id,
                "kanban bucket without an id; skipping board this cycle"
            );
            return None;
        };
        let raw_tasks = raw
            .get("tasks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for raw_task in raw_tasks {
            let mut task: Task = match serde_json::from_value(raw_task.clone()) {
                Ok(t) => t,
                Err(e) => {
                    debug!(bucket = bucket_id, error = %e, "undecodable bucket task dropped");
                    continue;
                }
            };
            if policy::is_task_hidden(&task, config) {
                continue;
            }
            if task.bucket_id.is_none() {
                task.bucket_id = Some(bucket_id);
            }
            tasks.push(task);
        }
        // Buckets survive even when the filter empties them.
        buckets.push(Bucket {
            id: bucket_id,
            tasks,
        });
    }

    let tasks = buckets.iter().flat_map(|b| b.tasks.iter().cloned()).collect();
    Some(KanbanBoard {
        project_id,
        view_id,
        buckets,
        tasks,
    })
}
