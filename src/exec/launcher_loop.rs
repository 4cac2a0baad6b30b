// src/exec/launcher_loop.rs

//! Background loop that starts launched workers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::RuntimeEvent;
use crate::exec::worker_runner::run_worker;
use crate::worker::NextWorker;

/// Spawn the background launcher loop.
///
/// The returned sender is what `RealLauncher` forwards launches to. Every
/// launch runs in its own Tokio task; the same worker may run several times
/// at once with different args (one `get_onc_ctd` per station, say).
pub fn spawn_launcher(
    config: Arc<Config>,
    config_file: PathBuf,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<NextWorker> {
    let (tx, mut rx) = mpsc::channel::<NextWorker>(32);

    tokio::spawn(async move {
        info!("launcher loop started");

        while let Some(worker) = rx.recv().await {
            let config = Arc::clone(&config);
            let config_file = config_file.clone();
            let runtime_tx = runtime_tx.clone();
            let name = worker.worker;

            tokio::spawn(async move {
                run_worker(worker, &config, &config_file, runtime_tx).await;
                debug!(worker = %name, "worker runner finished");
            });
        }

        info!("launcher loop finished (channel closed)");
    });

    tx
}
