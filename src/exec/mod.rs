// src/exec/mod.rs

//! Worker launch layer.
//!
//! This module is responsible for actually starting workers, locally or over
//! `ssh`, using `tokio::process::Command`, and reporting back to the
//! orchestration runtime via `RuntimeEvent`s.
//!
//! - [`command`] builds the command line for a launch.
//! - [`launcher_loop`] owns the background loop that receives launches.
//! - [`worker_runner`] runs one worker process and relays its output.
//! - [`backend`] provides the `LauncherBackend` trait, the `RealLauncher`
//!   used in production, and the `LoggingLauncher` used with `--debug`.
//!   Tests replace them with a fake implementation.

pub mod backend;
pub mod command;
pub mod launcher_loop;
pub mod worker_runner;

pub use backend::{LauncherBackend, LoggingLauncher, RealLauncher};
pub use command::{WorkerCommand, build_command};
pub use launcher_loop::spawn_launcher;
