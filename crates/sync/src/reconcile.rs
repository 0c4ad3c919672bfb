//! Lifecycle reconciliation against the host entity/device registry.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

/// One registered downstream representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Registry-assigned entity id.
    pub entity_id: String,
    /// Stable unique key, e.g. `task_42_due_date`.
    pub unique_key: String,
    /// Connection scope that owns the entry.
    pub scope_id: String,
    /// Grouping device, when the entity belongs to one.
    pub device_id: Option<String>,
}

/// Narrow contract over the host's entity/device registry.
///
/// Implementations must treat unknown ids as no-ops: reconciliation is
/// best-effort and must never fail a poll cycle.
pub trait EntityRegistry: Send + Sync {
    /// Entries within `scope_id` whose unique key starts with `prefix`.
    fn find_by_key_prefix(&self, scope_id: &str, prefix: &str) -> Vec<RegistryEntry>;

    /// Removes a single entity.
    fn deregister(&self, entity_id: &str);

    /// Removes a grouping device.
    fn deregister_device(&self, device_id: &str);

    /// True while any remaining entity still references `device_id`.
    fn device_in_use(&self, device_id: &str) -> bool;
}

impl<R: EntityRegistry + ?Sized> EntityRegistry for Arc<R> {
    fn find_by_key_prefix(&self, scope_id: &str, prefix: &str) -> Vec<RegistryEntry> {
        (**self).find_by_key_prefix(scope_id, prefix)
    }

    fn deregister(&self, entity_id: &str) {
        (**self).deregister(entity_id)
    }

    fn deregister_device(&self, device_id: &str) {
        (**self).deregister_device(device_id)
    }

    fn device_in_use(&self, device_id: &str) -> bool {
        (**self).device_in_use(device_id)
    }
}

/// Issues deregistration commands for representations whose source
/// entities disappeared from the snapshot.
pub struct Reconciler<R> {
    registry: R,
}

impl<R: EntityRegistry> Reconciler<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Removes every representation derived from `task_id`, then any
    /// grouping device left without members. Missing entries are an
    /// idempotent no-op.
    ///
    /// The match is a bare string prefix: removing task 4 also matches
    /// task 42's keys (`task_4` is a prefix of `task_42_title`). Kept
    /// as-is for compatibility with existing key sets; callers that
    /// need exact matching must encode a terminator into the key.
    pub fn remove_task(&self, scope_id: &str, task_id: i64) {
        self.remove_by_prefix(scope_id, &format!("task_{task_id}"));
    }

    /// Project counterpart of [`Reconciler::remove_task`].
    pub fn remove_project(&self, scope_id: &str, project_id: i64) {
        self.remove_by_prefix(scope_id, &format!("project_{project_id}"));
    }

    fn remove_by_prefix(&self, scope_id: &str, prefix: &str) {
        let entries = self.registry.find_by_key_prefix(scope_id, prefix);
        if entries.is_empty() {
            debug!(scope = scope_id, prefix, "no registry entries matched");
            return;
        }

        let mut devices: BTreeSet<String> = BTreeSet::new();
        for entry in &entries {
            if let Some(device_id) = &entry.device_id {
                devices.insert(device_id.clone());
            }
            self.registry.deregister(&entry.entity_id);
        }
        for device_id in devices {
            if !self.registry.device_in_use(&device_id) {
                self.registry.deregister_device(&device_id);
            }
        }
        info!(
            scope = scope_id,
            prefix,
            removed = entries.len(),
            "deregistered stale representations"
        );
    }
}

/// In-memory registry, used by the daemon and as a test double.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: Mutex<Vec<RegistryEntry>>,
    removed_devices: Mutex<Vec<String>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a representation, replacing any entry with the same
    /// entity id.
    pub fn register(&self, entry: RegistryEntry) {
        let mut entries = self.entries.lock().expect("registry poisoned");
        entries.retain(|e| e.entity_id != entry.entity_id);
        entries.push(entry);
    }

    /// All live entries, in registration order.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.entries.lock().expect("registry poisoned").clone()
    }

    /// Devices deregistered so far, in removal order.
    pub fn removed_devices(&self) -> Vec<String> {
        self.removed_devices.lock().expect("registry poisoned").clone()
    }
}

impl EntityRegistry for MemoryRegistry {
    fn find_by_key_prefix(&self, scope_id: &str, prefix: &str) -> Vec<RegistryEntry> {
        self.entries
            .lock()
            .expect("registry poisoned")
            .iter()
            .filter(|e| e.scope_id == scope_id && e.unique_key.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn deregister(&self, entity_id: &str) {
        self.entries
            .lock()
            .expect("registry poisoned")
            .retain(|e| e.entity_id != entity_id);
    }

    fn deregister_device(&self, device_id: &str) {
        self.removed_devices
            .lock()
            .expect("registry poisoned")
            .push(device_id.to_string());
    }

    fn device_in_use(&self, device_id: &str) -> bool {
        self.entries
            .lock()
            .expect("registry poisoned")
            .iter()
            .any(|e| e.device_id.as_deref() == Some(device_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(entity_id: &str, unique_key: &str, scope: &str, device: Option<&str>) -> RegistryEntry {
        RegistryEntry {
            entity_id: entity_id.to_string(),
            unique_key: unique_key.to_string(),
            scope_id: scope.to_string(),
            device_id: device.map(str::to_string),
        }
    }

    #[test]
    fn removes_entities_and_orphaned_device() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register(entry("e1", "task_42_title", "conn", Some("dev-42")));
        registry.register(entry("e2", "task_42_due_date", "conn", Some("dev-42")));
        registry.register(entry("e3", "task_7_title", "conn", Some("dev-7")));

        let reconciler = Reconciler::new(Arc::clone(&registry));
        reconciler.remove_task("conn", 42);

        let keys: Vec<String> = registry.entries().iter().map(|e| e.unique_key.clone()).collect();
        assert_eq!(keys, vec!["task_7_title"]);
        assert_eq!(registry.removed_devices(), vec!["dev-42"]);
    }

    #[test]
    fn shared_device_survives_partial_removal() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register(entry("e1", "task_42_title", "conn", Some("dev-shared")));
        registry.register(entry("e2", "task_7_title", "conn", Some("dev-shared")));

        let reconciler = Reconciler::new(Arc::clone(&registry));
        reconciler.remove_task("conn", 42);

        assert_eq!(registry.entries().len(), 1);
        assert!(registry.removed_devices().is_empty());
    }

    #[test]
    fn miss_is_a_noop() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register(entry("e1", "project_3", "conn", None));

        let reconciler = Reconciler::new(Arc::clone(&registry));
        reconciler.remove_task("conn", 999);
        reconciler.remove_project("other-scope", 3);

        assert_eq!(registry.entries().len(), 1);
    }

    #[test]
    fn scope_is_respected() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register(entry("e1", "task_42_title", "a", None));
        registry.register(entry("e2", "task_42_title", "b", None));

        let reconciler = Reconciler::new(Arc::clone(&registry));
        reconciler.remove_task("a", 42);

        let scopes: Vec<String> = registry.entries().iter().map(|e| e.scope_id.clone()).collect();
        assert_eq!(scopes, vec!["b"]);
    }
}
