use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use nowcast::engine::RuntimeEvent;
use nowcast::errors::Result;
use nowcast::exec::LauncherBackend;
use nowcast::message::{Message, MsgType};
use nowcast::worker::NextWorker;

/// Scripted reply for a launch; `None` means the worker died silently.
pub type Responder = Box<dyn Fn(&NextWorker) -> Option<Message> + Send>;

/// A fake launcher that:
/// - records which workers were "launched"
/// - immediately reports the responder's message for each launch, or a
///   `crash` when the responder has none (as the real launcher does for a
///   worker that exits without reporting).
pub struct FakeLauncher {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    launched: Arc<Mutex<Vec<NextWorker>>>,
    respond: Responder,
}

impl FakeLauncher {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        launched: Arc<Mutex<Vec<NextWorker>>>,
        respond: Responder,
    ) -> Self {
        Self {
            runtime_tx,
            launched,
            respond,
        }
    }
}

impl LauncherBackend for FakeLauncher {
    fn launch(
        &mut self,
        workers: Vec<NextWorker>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let launched = Arc::clone(&self.launched);
        let replies: Vec<Message> = workers
            .iter()
            .map(|w| (self.respond)(w).unwrap_or_else(|| Message::new(w.worker, MsgType::Crash)))
            .collect();

        Box::pin(async move {
            {
                let mut guard = launched.lock().unwrap();
                guard.extend(workers);
            }
            for reply in replies {
                tx.send(RuntimeEvent::WorkerFinished(reply))
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
