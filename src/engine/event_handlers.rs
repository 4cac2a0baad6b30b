// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, error, info, warn};

use crate::checklist::Checklist;
use crate::config::Config;
use crate::manager::{self, ManagerAction};
use crate::message::Message;
use crate::next_workers::{self, registry};
use crate::worker::{NextWorker, WorkerName};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Write this checklist snapshot to the checklist file.
    PersistChecklist(Checklist),
    /// Start these workers.
    Launch(Vec<NextWorker>),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn launches(&self) -> impl Iterator<Item = &NextWorker> {
        self.commands.iter().flat_map(|c| match c {
            CoreCommand::Launch(workers) => workers.as_slice(),
            _ => [].as_slice(),
        })
    }
}

/// Record a success, then consult the decision table.
pub fn handle_next_workers(
    config: &Config,
    checklist: &mut Checklist,
    msg: &Message,
) -> Vec<CoreCommand> {
    if let Err(err) = registry::check(msg.source, &msg.msg_type, config) {
        error!(worker = %msg.source, msg_type = %msg.msg_type, error = %err, "rejected message");
        return Vec::new();
    }

    let mut commands = Vec::new();
    if msg.msg_type.is_success() {
        if msg.source == WorkerName::ClearChecklist {
            checklist.clear();
        } else {
            checklist.update(msg.source.checklist_namespace(), msg.payload.clone());
        }
        push_persist(&mut commands, checklist);
    }

    match next_workers::after(msg, config, checklist) {
        Ok(next) => {
            debug!(worker = %msg.source, msg_type = %msg.msg_type, count = next.len(), "decided next workers");
            push_launch(&mut commands, next);
        }
        Err(err) => {
            error!(worker = %msg.source, msg_type = %msg.msg_type, error = %err, "no next workers");
        }
    }
    commands
}

/// Carry out the manager's actions for `msg`, in order.
pub fn handle_actions(
    config: &Config,
    checklist: &mut Checklist,
    msg: &Message,
) -> Vec<CoreCommand> {
    let actions = match manager::actions_for(msg, config, checklist) {
        Ok(Some(actions)) => actions,
        Ok(None) => {
            warn!(worker = %msg.source, msg_type = %msg.msg_type, "worker did not succeed");
            return Vec::new();
        }
        Err(err) => {
            error!(worker = %msg.source, msg_type = %msg.msg_type, error = %err, "no actions");
            return Vec::new();
        }
    };

    let mut commands = Vec::new();
    for action in actions {
        match action {
            ManagerAction::UpdateChecklist {
                worker,
                namespace,
                payload,
            } => {
                debug!(%worker, namespace, "updating checklist");
                checklist.update(&namespace, payload);
                push_persist(&mut commands, checklist);
            }
            ManagerAction::LaunchWorker(worker) => push_launch(&mut commands, vec![worker]),
            ManagerAction::FinishTheDay => {
                info!("finishing the day");
                checklist.clear();
                push_persist(&mut commands, checklist);
                push_launch(&mut commands, vec![NextWorker::new(WorkerName::RotateLogs)]);
            }
        }
    }
    commands
}

/// Every checklist mutation is followed by a write of the whole checklist.
fn push_persist(commands: &mut Vec<CoreCommand>, checklist: &Checklist) {
    commands.push(CoreCommand::PersistChecklist(checklist.clone()));
}

/// Append launches, joining them onto a directly preceding launch command.
fn push_launch(commands: &mut Vec<CoreCommand>, workers: Vec<NextWorker>) {
    if workers.is_empty() {
        return;
    }
    match commands.last_mut() {
        Some(CoreCommand::Launch(pending)) => pending.extend(workers),
        _ => commands.push(CoreCommand::Launch(workers)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_launches_are_joined() {
        let mut commands = Vec::new();
        push_launch(&mut commands, vec![NextWorker::new(WorkerName::MakeRunoffFile)]);
        push_launch(&mut commands, Vec::new());
        push_launch(&mut commands, vec![NextWorker::new(WorkerName::DownloadLiveOcean)]);
        assert_eq!(commands.len(), 1);

        push_persist(&mut commands, &Checklist::new());
        push_launch(&mut commands, vec![NextWorker::new(WorkerName::RotateLogs)]);
        assert_eq!(commands.len(), 3);
    }
}
