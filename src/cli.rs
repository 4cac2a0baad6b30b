// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::engine::DispatchMode;

/// Command-line arguments for `nowcast`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nowcast",
    version,
    about = "Manage the daily ocean nowcast/forecast worker pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "nowcast.toml")]
    pub config: String,

    /// Start with an empty checklist instead of loading the checklist file.
    ///
    /// The checklist is still written after every change.
    #[arg(long)]
    pub ignore_checklist: bool,

    /// Log launches instead of starting workers.
    #[arg(long)]
    pub debug: bool,

    /// Exit once no launched worker is still running.
    #[arg(long)]
    pub once: bool,

    /// Parse + validate, print the worker graph, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Which table decides what runs after each message.
    #[arg(long, value_enum, value_name = "MODE", default_value_t = DispatchMode::NextWorkers)]
    pub dispatch: DispatchMode,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NOWCAST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["nowcast"]).unwrap();
        assert_eq!(args.config, "nowcast.toml");
        assert_eq!(args.dispatch, DispatchMode::NextWorkers);
        assert!(!args.once && !args.debug && !args.ignore_checklist);
    }

    #[test]
    fn dispatch_mode_is_kebab_case() {
        let args = CliArgs::try_parse_from(["nowcast", "--dispatch", "actions", "--once"]).unwrap();
        assert_eq!(args.dispatch, DispatchMode::Actions);
        assert!(args.once);
        assert!(CliArgs::try_parse_from(["nowcast", "--dispatch", "manager"]).is_err());
    }
}
