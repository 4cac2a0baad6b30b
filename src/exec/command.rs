// src/exec/command.rs

//! Command lines for worker launches.

use std::path::Path;

use tokio::process::Command;

use crate::config::Config;
use crate::errors::{NowcastError, Result};
use crate::worker::NextWorker;

/// Program and arguments for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Build the command line for `worker`.
///
/// Local workers run as `<python> -m <module> <config file> <args>`. Remote
/// workers run the same way through `ssh`, using the host's interpreter,
/// config file and key when it sets them.
pub fn build_command(worker: &NextWorker, config: &Config, config_file: &Path) -> Result<WorkerCommand> {
    let local_config = config_file.display().to_string();

    if worker.is_local() {
        let mut args = vec!["-m".to_string(), worker.worker.module(), local_config];
        args.extend(worker.args.iter().cloned());
        return Ok(WorkerCommand {
            program: config.manager.python.clone(),
            args,
        });
    }

    let host = config.host(&worker.host).ok_or_else(|| {
        NowcastError::ConfigError(format!(
            "{} is to run on unknown host '{}'",
            worker.worker, worker.host
        ))
    })?;

    let mut args = Vec::new();
    if let Some(key) = &host.ssh_key {
        args.push("-i".to_string());
        args.push(key.clone());
    }
    args.push(worker.host.clone());
    args.push(host.python.clone().unwrap_or_else(|| config.manager.python.clone()));
    args.push("-m".to_string());
    args.push(worker.worker.module());
    args.push(host.config_file.clone().unwrap_or(local_config));
    args.extend(worker.args.iter().cloned());

    Ok(WorkerCommand {
        program: "ssh".to_string(),
        args,
    })
}
