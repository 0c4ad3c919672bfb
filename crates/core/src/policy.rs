//! Selection policy: which projects and tasks are in scope.

use crate::config::{SyncConfig, ALL_PROJECTS};
use crate::model::Task;

/// True when `project_id` is selected for synchronization.
///
/// The sentinel selection matches every id unconditionally; an explicit
/// selection matches on the decimal string form of the id.
pub fn is_project_selected(project_id: i64, config: &SyncConfig) -> bool {
    if config.selected_projects.iter().any(|s| s == ALL_PROJECTS) {
        return true;
    }
    let id = project_id.to_string();
    config.selected_projects.iter().any(|s| *s == id)
}

/// True when the task must be dropped from the snapshot.
pub fn is_task_hidden(task: &Task, config: &SyncConfig) -> bool {
    config.hide_done && task.done
}

/// The configured kanban (project, view) pair, when both ids are
/// present and parse to positive integers.
pub fn resolve_kanban_target(config: &SyncConfig) -> Option<(i64, i64)> {
    let project_id = config.kanban_project_id.as_ref()?.as_positive()?;
    let view_id = config.kanban_view_id.as_ref()?.as_positive()?;
    Some((project_id, view_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdValue;

    fn explicit(ids: &[&str]) -> SyncConfig {
        SyncConfig {
            selected_projects: ids.iter().map(|s| s.to_string()).collect(),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn all_sentinel_selects_everything() {
        let config = SyncConfig::default();
        for id in [-5, 0, 1, 3, 9999] {
            assert!(is_project_selected(id, &config));
        }
    }

    #[test]
    fn explicit_selection_matches_by_string_form() {
        let config = explicit(&["3", "7"]);
        assert!(is_project_selected(3, &config));
        assert!(is_project_selected(7, &config));
        assert!(!is_project_selected(4, &config));
    }

    #[test]
    fn sentinel_wins_even_in_mixed_selection() {
        let config = explicit(&["3", ALL_PROJECTS]);
        assert!(is_project_selected(999, &config));
    }

    #[test]
    fn hidden_only_when_done_and_hide_done() {
        let task = Task {
            id: 1,
            project_id: 1,
            title: "t".into(),
            description: String::new(),
            done: true,
            due_date: None,
            start_date: None,
            end_date: None,
            priority: 0,
            assignees: vec![],
            repeat_after: None,
            repeat_mode: 0,
            bucket_id: None,
        };
        let mut config = SyncConfig::default();
        assert!(!is_task_hidden(&task, &config));
        config.hide_done = true;
        assert!(is_task_hidden(&task, &config));
        let open = Task { done: false, ..task };
        assert!(!is_task_hidden(&open, &config));
    }

    #[test]
    fn kanban_target_requires_both_positive_ids() {
        let mut config = SyncConfig::default();
        assert_eq!(resolve_kanban_target(&config), None);

        config.kanban_project_id = Some(IdValue::Int(4));
        assert_eq!(resolve_kanban_target(&config), None);

        config.kanban_view_id = Some(IdValue::Str("9".into()));
        assert_eq!(resolve_kanban_target(&config), Some((4, 9)));

        config.kanban_view_id = Some(IdValue::Str("zero".into()));
        assert_eq!(resolve_kanban_target(&config), None);

        config.kanban_view_id = Some(IdValue::Int(0));
        assert_eq!(resolve_kanban_target(&config), None);
    }
}
