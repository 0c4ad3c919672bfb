//! Wire-shape tests for the core model.

use taskmirror_core::model::{Snapshot, Task};
use time::macros::datetime;

#[test]
fn task_decodes_from_remote_payload() {
    let payload = r#"{
        "id": 42,
        "project_id": 3,
        "title": "Water the plants",
        "description": "Back porch first",
        "done": false,
        "due_date": "2025-06-01T09:00:00Z",
        "priority": 3,
        "assignees": [{"id": 1, "username": "demo"}],
        "repeat_after": 86400,
        "repeat_mode": 0
    }"#;

    let task: Task = serde_json::from_str(payload).unwrap();
    assert_eq!(task.id, 42);
    assert_eq!(task.project_id, 3);
    assert_eq!(task.title, "Water the plants");
    assert!(!task.done);
    assert_eq!(task.due_date, Some(datetime!(2025-06-01 09:00 UTC)));
    assert_eq!(task.priority, 3);
    assert_eq!(task.assignees.len(), 1);
    assert_eq!(task.repeat_after, Some(86_400));
    assert_eq!(task.bucket_id, None);
}

#[test]
fn task_tolerates_sparse_payloads() {
    // The remote omits most fields on minimal tasks.
    let task: Task = serde_json::from_str(r#"{"id": 7, "project_id": 1}"#).unwrap();
    assert_eq!(task.title, "");
    assert_eq!(task.due_date, None);
    assert!(task.assignees.is_empty());
    assert_eq!(task.repeat_after, None);
}

#[test]
fn empty_snapshot_has_no_kanban() {
    let snapshot = Snapshot::default();
    assert!(snapshot.projects.is_empty());
    assert!(snapshot.tasks.is_empty());
    assert!(snapshot.kanban.is_none());
}
