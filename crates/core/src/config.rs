use serde::{Deserialize, Serialize};

/// Sentinel selection entry meaning "sync every project".
pub const ALL_PROJECTS: &str = "__all__";

/// Default poll interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// A configuration id that may arrive as an integer or a string.
///
/// The remote config surface is loosely typed; rather than propagating
/// that ambiguity inward, values are validated at the boundary via
/// [`IdValue::as_positive`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdValue {
    Int(i64),
    Str(String),
}

impl IdValue {
    /// The positive integer form of the value, if it has one.
    pub fn as_positive(&self) -> Option<i64> {
        let n = match self {
            IdValue::Int(n) => *n,
            IdValue::Str(s) => s.trim().parse().ok()?,
        };
        (n > 0).then_some(n)
    }
}

/// Per-connection sync configuration.
///
/// Owned externally (CLI, config entry); read-only to the core for the
/// duration of a cycle.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote base URL. Opaque to the core.
    pub base_url: String,
    /// API token. Opaque to the core.
    pub token: String,
    pub interval_secs: u64,
    pub strict_tls: bool,
    /// Either the [`ALL_PROJECTS`] sentinel or explicit project id
    /// strings.
    pub selected_projects: Vec<String>,
    /// Drop completed tasks from the snapshot.
    pub hide_done: bool,
    pub kanban_project_id: Option<IdValue>,
    pub kanban_view_id: Option<IdValue>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            strict_tls: true,
            selected_projects: vec![ALL_PROJECTS.to_string()],
            hide_done: false,
            kanban_project_id: None,
            kanban_view_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_value_accepts_ints_and_numeric_strings() {
        assert_eq!(IdValue::Int(7).as_positive(), Some(7));
        assert_eq!(IdValue::Str("7".into()).as_positive(), Some(7));
        assert_eq!(IdValue::Str(" 12 ".into()).as_positive(), Some(12));
    }

    #[test]
    fn id_value_rejects_non_positive_and_junk() {
        assert_eq!(IdValue::Int(0).as_positive(), None);
        assert_eq!(IdValue::Int(-3).as_positive(), None);
        assert_eq!(IdValue::Str("".into()).as_positive(), None);
        assert_eq!(IdValue::Str("abc".into()).as_positive(), None);
        assert_eq!(IdValue::Str("-1".into()).as_positive(), None);
    }

    #[test]
    fn id_value_deserializes_untagged() {
        let v: IdValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, IdValue::Int(42));
        let v: IdValue = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(v, IdValue::Str("42".into()));
    }
}
