// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::checklist::store::ChecklistStore;
use crate::errors::Result;
use crate::exec::LauncherBackend;
use crate::worker::NextWorker;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RuntimeEvent};

/// Feeds worker messages to the core, and delegates persistence to a
/// `ChecklistStore` and worker launches to a `LauncherBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<L: LauncherBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    launcher: L,
    store: ChecklistStore,
}

impl<L: LauncherBackend> fmt::Debug for Runtime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<L: LauncherBackend> Runtime<L> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        launcher: L,
        store: ChecklistStore,
    ) -> Self {
        Self {
            core,
            event_rx,
            launcher,
            store,
        }
    }

    /// Main event loop.
    ///
    /// - Launches the startup workers.
    /// - Consumes `RuntimeEvent`s from `event_rx` and feeds them to the core.
    /// - Executes commands returned by the core (persist, launch, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("nowcast manager started");

        let startup = self.core.start();
        if self.execute_step(startup).await? {
            loop {
                let Some(event) = self.event_rx.recv().await else {
                    info!("runtime event channel closed; exiting");
                    break;
                };
                debug!(?event, "runtime received event");

                let step = self.core.step(event);
                if !self.execute_step(step).await? {
                    info!("core requested exit; stopping runtime");
                    break;
                }
            }
        }

        info!("nowcast manager exiting");
        Ok(())
    }

    async fn execute_step(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            self.execute_command(command).await?;
        }
        Ok(step.keep_running)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::PersistChecklist(checklist) => {
                // The in-memory checklist stays authoritative and the next
                // write replaces the whole file.
                if let Err(err) = self.store.write(&checklist) {
                    error!(path = ?self.store.path(), error = %err, "failed to persist checklist");
                }
            }
            CoreCommand::Launch(workers) => self.launch(workers).await?,
            CoreCommand::RequestExit => {
                // keep_running=false already ends the loop.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn launch(&mut self, workers: Vec<NextWorker>) -> Result<()> {
        for worker in &workers {
            info!(worker = %worker.worker, args = ?worker.args, host = %worker.host, "launching worker");
        }
        self.launcher.launch(workers).await
    }
}
