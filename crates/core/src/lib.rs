#![forbid(unsafe_code)]

//! Shared models and pure logic for taskmirror.
//!
//! Everything in this crate is side-effect free: value types for the
//! remote data, the per-connection configuration, the selection policy
//! and the snapshot diff engine. The async fetch/poll machinery lives
//! in `taskmirror-sync`.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod policy;

pub use config::{IdValue, SyncConfig, ALL_PROJECTS, DEFAULT_INTERVAL_SECS};
pub use diff::{diff, SyncOutcome};
pub use error::{FetchError, RemoteError};
pub use model::{Bucket, KanbanBoard, Project, Snapshot, Task};
