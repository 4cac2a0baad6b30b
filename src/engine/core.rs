// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated checklist
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - writing checklist snapshots to disk
//! - handing launches to the launcher backend
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! processes.

use std::sync::Arc;

use tracing::{debug, info};

use crate::checklist::Checklist;
use crate::config::Config;
use crate::engine::event_handlers::{CoreCommand, CoreStep, handle_actions, handle_next_workers};
use crate::engine::{DispatchMode, RuntimeEvent, RuntimeOptions};
use crate::manager::RemoteLogRegistry;
use crate::message::Message;
use crate::next_workers::registry;
use crate::worker::NextWorker;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    config: Arc<Config>,
    checklist: Checklist,
    remote_logs: RemoteLogRegistry,
    /// Launched workers that have not reported back yet.
    in_flight: usize,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(config: Arc<Config>, checklist: Checklist, options: RuntimeOptions) -> Self {
        Self {
            config,
            checklist,
            remote_logs: RemoteLogRegistry::new(),
            in_flight: 0,
            options,
        }
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn remote_logs(&self) -> &RemoteLogRegistry {
        &self.remote_logs
    }

    /// Launch the configured startup workers.
    pub fn start(&mut self) -> CoreStep {
        let workers: Vec<NextWorker> = self
            .config
            .manager
            .startup
            .iter()
            .map(|s| NextWorker::new(s.worker).args(&s.args).on_host(&s.host))
            .collect();
        info!(count = workers.len(), "launching startup workers");

        let commands = if workers.is_empty() {
            Vec::new()
        } else {
            vec![CoreCommand::Launch(workers)]
        };
        self.finish_step(commands)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::WorkerFinished(msg) => self.handle_message(msg),
            RuntimeEvent::WorkerLog {
                worker,
                level,
                text,
            } => {
                self.remote_logs.relay(worker, level, &text);
                CoreStep {
                    commands: Vec::new(),
                    keep_running: true,
                }
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn handle_message(&mut self, msg: Message) -> CoreStep {
        self.in_flight = self.in_flight.saturating_sub(1);
        info!(worker = %msg.source, msg_type = %msg.msg_type, "received message");

        if registry::check(msg.source, &msg.msg_type, &self.config).is_ok() {
            self.remote_logs.observe(&msg, &self.config);
        }

        let commands = match self.options.dispatch {
            DispatchMode::NextWorkers => {
                handle_next_workers(&self.config, &mut self.checklist, &msg)
            }
            DispatchMode::Actions => {
                handle_actions(&self.config, &mut self.checklist, &msg)
            }
        };
        self.finish_step(commands)
    }

    /// Count launches and decide whether the loop goes on.
    fn finish_step(&mut self, mut commands: Vec<CoreCommand>) -> CoreStep {
        let launched: usize = commands
            .iter()
            .map(|c| match c {
                CoreCommand::Launch(workers) => workers.len(),
                _ => 0,
            })
            .sum();
        self.in_flight += launched;
        debug!(launched, in_flight = self.in_flight, "step finished");

        // In `--once` mode, exit when nothing is left running.
        let mut keep_running = true;
        if self.options.exit_when_idle && self.in_flight == 0 {
            info!("no workers in flight and exit_when_idle=true, stopping");
            keep_running = false;
            commands.push(CoreCommand::RequestExit);
        }

        CoreStep {
            commands,
            keep_running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::RemoteLogLevel;
    use crate::message::MsgType;
    use crate::next_workers::test_support::{CONFIG, config, config_from};
    use crate::worker::WorkerName;
    use serde_json::json;

    fn core(options: RuntimeOptions) -> CoreRuntime {
        CoreRuntime::new(Arc::new(config()), Checklist::new(), options)
    }

    fn finished(msg: Message) -> RuntimeEvent {
        RuntimeEvent::WorkerFinished(msg)
    }

    #[test]
    fn success_is_recorded_before_launches() {
        let mut core = core(RuntimeOptions::default());
        let msg = Message::new(WorkerName::DownloadLiveOcean, MsgType::Success(Default::default()))
            .with_payload(json!({"2018-01-20": ["low_passed_UBC.nc"]}));

        let step = core.step(finished(msg));

        assert!(step.keep_running);
        assert!(matches!(step.commands[0], CoreCommand::PersistChecklist(_)));
        assert_eq!(
            step.launches().collect::<Vec<_>>(),
            vec![&NextWorker::new(WorkerName::MakeLiveOceanFiles).args(["--run-date", "2018-01-20"])]
        );
        assert!(core.checklist().get("Live Ocean products").is_some());
    }

    #[test]
    fn failure_is_not_recorded() {
        let mut core = core(RuntimeOptions::default());
        let step = core.step(finished(Message::new(
            WorkerName::DownloadWeather,
            MsgType::failure("06"),
        )));
        assert!(step.commands.is_empty());
        assert!(core.checklist().is_empty());
    }

    #[test]
    fn unknown_message_type_is_logged_and_dropped() {
        let mut core = core(RuntimeOptions::default());
        let step = core.step(finished(Message::new(
            WorkerName::DownloadWeather,
            MsgType::success("07"),
        )));
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
        assert!(core.checklist().is_empty());
    }

    #[test]
    fn missing_prerequisite_records_but_launches_nothing() {
        let mut core = core(RuntimeOptions::default());
        let msg = Message::new(WorkerName::DownloadResults, MsgType::success("nowcast"))
            .with_payload(json!({"nowcast": ["results"]}));
        let step = core.step(finished(msg));
        assert_eq!(step.launches().count(), 0);
        assert_eq!(step.commands.len(), 1);
    }

    #[test]
    fn clear_checklist_success_empties_checklist() {
        let mut core = core(RuntimeOptions::default());
        core.step(finished(
            Message::new(WorkerName::MakeRunoffFile, MsgType::Success(Default::default()))
                .with_payload(json!({"b": "rivers.nc"})),
        ));
        assert!(!core.checklist().is_empty());

        let step = core.step(finished(Message::new(
            WorkerName::ClearChecklist,
            MsgType::Success(Default::default()),
        )));
        assert!(core.checklist().is_empty());
        assert_eq!(step.commands[0], CoreCommand::PersistChecklist(Checklist::new()));
        assert_eq!(
            step.launches().collect::<Vec<_>>(),
            vec![&NextWorker::new(WorkerName::RotateLogs)]
        );
    }

    #[test]
    fn finish_the_day_clears_and_rotates_logs() {
        let mut core = core(RuntimeOptions {
            dispatch: DispatchMode::Actions,
            ..RuntimeOptions::default()
        });
        core.step(finished(
            Message::new(
                WorkerName::MakeSitePage,
                MsgType::Success(crate::message::MsgDetail::staged("nowcast-green", "research")),
            )
            .with_payload(json!({"nowcast-green research": "index.html"})),
        ));

        let step = core.step(finished(Message::new(
            WorkerName::PushToWeb,
            MsgType::Success(Default::default()),
        )));
        assert!(core.checklist().is_empty());
        assert_eq!(
            step.commands.last(),
            Some(&CoreCommand::Launch(vec![NextWorker::new(WorkerName::RotateLogs)]))
        );
    }

    #[test]
    fn once_mode_exits_when_nothing_is_in_flight() {
        let toml = format!(
            "[manager]\nstartup = [{{ worker = \"download_weather\", args = [\"12\"] }}]\n{CONFIG}"
        );
        let options = RuntimeOptions {
            exit_when_idle: true,
            ..RuntimeOptions::default()
        };
        let mut core = CoreRuntime::new(Arc::new(config_from(&toml)), Checklist::new(), options);

        let step = core.start();
        assert!(step.keep_running);
        assert_eq!(core.in_flight(), 1);

        let step = core.step(finished(Message::new(
            WorkerName::DownloadWeather,
            MsgType::success("00"),
        )));
        assert!(!step.keep_running);
        assert_eq!(step.commands.last(), Some(&CoreCommand::RequestExit));
    }

    #[test]
    fn rejected_messages_leave_remote_logs_alone() {
        let mut core = core(RuntimeOptions::default());
        let links = |msg_type: &str| {
            Message::new(WorkerName::MakeForcingLinks, MsgType::success(msg_type))
                .with_payload(json!({"west.cloud": "forcing links"}))
        };

        core.step(finished(links("hindcast")));
        assert!(!core.remote_logs().is_attached(WorkerName::RunNemo));

        core.step(finished(links("nowcast+")));
        assert!(core.remote_logs().is_attached(WorkerName::RunNemo));
    }

    #[test]
    fn success_is_persisted_when_started_without_checklist_file() {
        // `--ignore-checklist` only changes the starting checklist.
        let mut core = core(RuntimeOptions::default());
        let step = core.step(finished(
            Message::new(WorkerName::MakeRunoffFile, MsgType::Success(Default::default()))
                .with_payload(json!({"b": "rivers.nc"})),
        ));
        assert_eq!(
            step.commands[0],
            CoreCommand::PersistChecklist(core.checklist().clone())
        );
    }

    #[test]
    fn worker_logs_do_not_change_state() {
        let mut core = core(RuntimeOptions::default());
        let step = core.step(RuntimeEvent::WorkerLog {
            worker: WorkerName::RunNemo,
            level: RemoteLogLevel::Info,
            text: "timestep 10".to_string(),
        });
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = core(RuntimeOptions::default());
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
