#![forbid(unsafe_code)]

//! Fetch pipeline, poll coordinator and lifecycle reconciliation.
//!
//! One [`Coordinator`] per remote connection owns the current
//! [`taskmirror_core::Snapshot`], drives the timed poll loop and
//! applies the side effects that each cycle's diff calls for: a
//! coalesced downstream reload on additions, targeted deregistration
//! on removals.

pub mod coordinator;
pub mod fetch;
pub mod reconcile;
pub mod remote;

pub use coordinator::{Coordinator, RefreshHandle, SyncStatus, CYCLE_TIMEOUT_SECS};
pub use fetch::fetch_snapshot;
pub use reconcile::{EntityRegistry, MemoryRegistry, Reconciler, RegistryEntry};
pub use remote::RemoteClient;
