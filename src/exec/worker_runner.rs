// src/exec/worker_runner.rs

//! Individual worker process runner.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::engine::RuntimeEvent;
use crate::exec::command::build_command;
use crate::manager::RemoteLogLevel;
use crate::message::{Message, MsgType};
use crate::worker::{NextWorker, WorkerName};

/// Run a single worker process, relaying its output to the runtime.
///
/// Exactly one `WorkerFinished` event is sent per launch: the worker's own
/// message, or a synthesized `crash` if it could not be started or exited
/// without reporting.
pub async fn run_worker(
    worker: NextWorker,
    config: &Config,
    config_file: &Path,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let name = worker.worker;
    let reported = match run_worker_inner(&worker, config, config_file, &runtime_tx).await {
        Ok(reported) => reported,
        Err(err) => {
            error!(%worker, error = %err, "worker launch error");
            false
        }
    };

    if !reported {
        warn!(worker = %name, "worker did not report; sending crash");
        let _ = runtime_tx
            .send(RuntimeEvent::WorkerFinished(Message::new(name, MsgType::Crash)))
            .await;
    }
}

/// Returns whether the worker sent its message.
async fn run_worker_inner(
    worker: &NextWorker,
    config: &Config,
    config_file: &Path,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> Result<bool> {
    let command = build_command(worker, config, config_file)?;
    info!(%worker, program = %command.program, args = ?command.args, "starting worker process");

    let mut child = command
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning process for worker '{}'", worker.worker))?;

    // The message may arrive on either stream; the first one wins.
    let reported = Arc::new(AtomicBool::new(false));

    // Always consume stderr so buffers don't fill.
    let stderr_relay = child.stderr.take().map(|stderr| {
        let tx = runtime_tx.clone();
        let name = worker.worker;
        let reported = Arc::clone(&reported);
        tokio::spawn(async move {
            relay_lines(name, stderr, &tx, &reported).await;
        })
    });

    if let Some(stdout) = child.stdout.take() {
        relay_lines(worker.worker, stdout, runtime_tx, &reported).await;
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of worker '{}'", worker.worker))?;
    if let Some(relay) = stderr_relay {
        if let Err(err) = relay.await {
            warn!(%worker, error = %err, "stderr relay task failed");
        }
    }
    let reported = reported.load(Ordering::SeqCst);
    info!(
        %worker,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        reported,
        "worker process exited"
    );

    Ok(reported)
}

/// Forward the first message line as `WorkerFinished` and everything else
/// as `WorkerLog`.
async fn relay_lines<R>(
    worker: WorkerName,
    stream: R,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    reported: &AtomicBool,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let event = match classify_line(worker, &line, reported.load(Ordering::SeqCst)) {
            LineKind::Message(msg) if !reported.swap(true, Ordering::SeqCst) => {
                RuntimeEvent::WorkerFinished(msg)
            }
            LineKind::Message(_) => {
                let (level, text) = RemoteLogLevel::split_line(&line);
                RuntimeEvent::WorkerLog {
                    worker,
                    level,
                    text: text.to_string(),
                }
            }
            LineKind::Log(level, text) => RuntimeEvent::WorkerLog {
                worker,
                level,
                text: text.to_string(),
            },
        };
        if runtime_tx.send(event).await.is_err() {
            debug!(%worker, "runtime gone; dropping worker output");
            return;
        }
    }
}

#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    Message(Message),
    Log(RemoteLogLevel, &'a str),
}

fn classify_line(worker: WorkerName, line: &str, reported: bool) -> LineKind<'_> {
    if !reported && line.trim_start().starts_with('{') {
        match Message::from_json_line(line) {
            Ok(msg) if msg.source == worker => return LineKind::Message(msg),
            Ok(msg) => {
                warn!(%worker, source = %msg.source, "message from another worker ignored");
            }
            Err(err) => {
                debug!(%worker, error = %err, "output line is not a message");
            }
        }
    }
    let (level, text) = RemoteLogLevel::split_line(line);
    LineKind::Log(level, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_line_from_worker_is_its_message() {
        let line = r#"{"source": "make_runoff_file", "type": "success", "payload": {"b": "f.nc"}}"#;
        match classify_line(WorkerName::MakeRunoffFile, line, false) {
            LineKind::Message(msg) => {
                assert_eq!(msg.source, WorkerName::MakeRunoffFile);
                assert!(msg.msg_type.is_success());
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn only_the_first_message_counts() {
        let line = r#"{"source": "make_runoff_file", "type": "success"}"#;
        assert!(matches!(
            classify_line(WorkerName::MakeRunoffFile, line, true),
            LineKind::Log(RemoteLogLevel::Info, _)
        ));
    }

    #[test]
    fn message_from_other_worker_is_logged() {
        let line = r#"{"source": "run_NEMO", "type": "crash"}"#;
        assert!(matches!(
            classify_line(WorkerName::WatchNemo, line, false),
            LineKind::Log(..)
        ));
    }

    #[test]
    fn plain_lines_are_logs_with_level() {
        assert_eq!(
            classify_line(WorkerName::RunNemo, "ERROR: namelist missing", false),
            LineKind::Log(RemoteLogLevel::Error, "namelist missing")
        );
    }

    #[cfg(unix)]
    async fn finished_events_from_script(script: &str) -> Vec<Message> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake-python");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = crate::next_workers::test_support::config();
        config.manager.python = path.display().to_string();
        let (tx, mut rx) = mpsc::channel(16);

        run_worker(
            NextWorker::new(WorkerName::MakeRunoffFile),
            &config,
            Path::new("nowcast.toml"),
            tx,
        )
        .await;

        let mut finished = Vec::new();
        while let Some(event) = rx.recv().await {
            if let RuntimeEvent::WorkerFinished(msg) = event {
                finished.push(msg);
            }
        }
        finished
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn message_on_stderr_is_the_only_completion() {
        let finished = finished_events_from_script(
            r#"echo 'INFO: making runoff file' >&2
echo '{"source": "make_runoff_file", "type": "success", "payload": {"b": "f.nc"}}' >&2"#,
        )
        .await;

        assert_eq!(finished.len(), 1);
        assert!(finished[0].msg_type.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn message_then_nonzero_exit_is_not_a_crash() {
        let finished = finished_events_from_script(
            r#"echo '{"source": "make_runoff_file", "type": "failure"}'
exit 3"#,
        )
        .await;

        assert_eq!(finished.len(), 1);
        assert!(!finished[0].msg_type.is_success());
        assert_ne!(finished[0].msg_type, MsgType::Crash);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_worker_is_one_crash() {
        let finished = finished_events_from_script("echo 'no message here'").await;
        assert_eq!(finished, vec![Message::new(WorkerName::MakeRunoffFile, MsgType::Crash)]);
    }

    #[tokio::test]
    async fn unknown_host_synthesizes_crash() {
        let config = crate::next_workers::test_support::config();
        let (tx, mut rx) = mpsc::channel(4);
        let worker = NextWorker::new(WorkerName::RunNemo).on_host("graham");

        run_worker(worker, &config, Path::new("nowcast.toml"), tx).await;

        match rx.recv().await {
            Some(RuntimeEvent::WorkerFinished(msg)) => {
                assert_eq!(msg, Message::new(WorkerName::RunNemo, MsgType::Crash));
            }
            other => panic!("expected crash, got {other:?}"),
        }
    }
}
