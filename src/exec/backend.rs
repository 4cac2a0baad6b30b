// src/exec/backend.rs

//! Pluggable launcher backend abstraction.
//!
//! The runtime talks to a `LauncherBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake launcher in tests while keeping the
//! production implementation in [`launcher_loop`](super::launcher_loop).

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::worker::NextWorker;

use super::launcher_loop::spawn_launcher;

/// Trait abstracting how worker launches are carried out.
///
/// Production code uses [`RealLauncher`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait LauncherBackend: Send {
    /// Start the given workers.
    ///
    /// The implementation is free to:
    /// - spawn OS processes (production)
    /// - simulate worker messages and emit `RuntimeEvent`s (tests)
    fn launch(
        &mut self,
        workers: Vec<NextWorker>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real launcher used in production.
///
/// Forwards launches to the background loop from [`spawn_launcher`].
pub struct RealLauncher {
    tx: mpsc::Sender<NextWorker>,
}

impl RealLauncher {
    /// Spawns the background launcher loop immediately.
    pub fn new(
        config: Arc<Config>,
        config_file: PathBuf,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let tx = spawn_launcher(config, config_file, runtime_tx);
        Self { tx }
    }
}

impl LauncherBackend for RealLauncher {
    fn launch(
        &mut self,
        workers: Vec<NextWorker>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for worker in workers {
                tx.send(worker).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}

/// Logs launches without starting anything.
#[derive(Debug, Default)]
pub struct LoggingLauncher;

impl LauncherBackend for LoggingLauncher {
    fn launch(
        &mut self,
        workers: Vec<NextWorker>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for worker in workers {
                info!(%worker, "debug mode; not launching");
            }
            Ok(())
        })
    }
}
