// src/engine/mod.rs

//! Orchestration engine for the nowcast manager.
//!
//! This module ties together:
//! - the checklist and its persistence
//! - the decision table or the manager action dispatcher
//! - the main runtime event loop that reacts to:
//!   - worker completion messages
//!   - log lines relayed from running workers
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use clap::ValueEnum;

use crate::manager::RemoteLogLevel;
use crate::message::Message;
use crate::worker::WorkerName;

/// Which table turns completion messages into launches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DispatchMode {
    /// `next_workers::after`, with the engine recording payloads itself.
    #[default]
    NextWorkers,
    /// `manager::actions_for`, carrying out the returned actions in order.
    Actions,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no launched worker is still in flight
    /// (used for `--once`).
    pub exit_when_idle: bool,

    pub dispatch: DispatchMode,
}

/// Events flowing into the runtime from launched workers or signal handling.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A worker reported its outcome (or was found dead and a crash was
    /// synthesized for it).
    WorkerFinished(Message),
    /// A non-message output line from a running worker.
    WorkerLog {
        worker: WorkerName,
        level: RemoteLogLevel,
        text: String,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
