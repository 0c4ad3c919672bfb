use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use taskmirror_core::error::RemoteError;
use taskmirror_core::model::{Project, Task};

/// Capability surface of the remote task server.
///
/// Implementations own transport and auth; the fetch pipeline only
/// sees this contract. A failing call aborts the cycle it belongs to.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// All projects visible to the configured token.
    async fn list_projects(&self) -> Result<Vec<Project>, RemoteError>;

    /// All tasks belonging to one project.
    async fn list_tasks(&self, project_id: i64) -> Result<Vec<Task>, RemoteError>;

    /// Raw JSON request against an API path. Used only for the kanban
    /// view listing (`GET /projects/{p}/views/{v}/tasks`).
    async fn raw_request(&self, method: &str, path: &str) -> Result<Value, RemoteError>;
}

#[async_trait]
impl<C: RemoteClient + ?Sized> RemoteClient for Arc<C> {
    async fn list_projects(&self) -> Result<Vec<Project>, RemoteError> {
        (**self).list_projects().await
    }

    async fn list_tasks(&self, project_id: i64) -> Result<Vec<Task>, RemoteError> {
        (**self).list_tasks(project_id).await
    }

    async fn raw_request(&self, method: &str, path: &str) -> Result<Value, RemoteError> {
        (**self).raw_request(method, path).await
    }
}
