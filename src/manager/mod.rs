// src/manager/mod.rs

//! The in-process manager's view of the workflow.
//!
//! Instead of launch descriptors for an external scheduler, the manager
//! turns each completion into an ordered list of [`ManagerAction`]s that the
//! engine carries out itself: record the payload, launch workers, finish the
//! day.
//!
//! - [`dispatch`] builds the action lists.
//! - [`remote_logs`] tracks log spans for workers that run on the cloud host
//!   and relay their log output through the manager.

use serde_json::Value;

use crate::worker::{NextWorker, WorkerName};

pub mod dispatch;
pub mod remote_logs;

pub use dispatch::actions_for;
pub use remote_logs::{RemoteLogLevel, RemoteLogRegistry};

/// One step the manager performs after a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerAction {
    /// Merge `payload` into the checklist under `namespace`, then persist.
    UpdateChecklist {
        worker: WorkerName,
        namespace: String,
        payload: Value,
    },
    LaunchWorker(NextWorker),
    /// Clear and persist the checklist, then rotate the logs.
    FinishTheDay,
}
