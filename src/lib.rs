// src/lib.rs

pub mod checklist;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod manager;
pub mod message;
pub mod next_workers;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::checklist::Checklist;
use crate::checklist::store::ChecklistStore;
use crate::cli::CliArgs;
use crate::config::{Config, load_and_validate};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::{LoggingLauncher, RealLauncher};
use crate::next_workers::graph;
use crate::worker::WorkerName;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - checklist store and core runtime
/// - launcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let config = Arc::new(load_and_validate(&config_path)?);

    if args.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let store = ChecklistStore::on_disk(&config.manager.checklist_file);
    let checklist = initial_checklist(&store, args.ignore_checklist)?;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
        dispatch: args.dispatch,
    };
    info!(?options, config = ?config_path, "manager options");

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(Arc::clone(&config), checklist, options);

    if args.debug {
        Runtime::new(core, rt_rx, LoggingLauncher, store).run().await?;
    } else {
        let launcher = RealLauncher::new(config, config_path, rt_tx);
        Runtime::new(core, rt_rx, launcher, store).run().await?;
    }
    Ok(())
}

/// The checklist the manager starts with. Ignoring the file only skips the
/// load; the store still receives every later write.
fn initial_checklist(store: &ChecklistStore, ignore_file: bool) -> Result<Checklist> {
    if ignore_file {
        info!(path = ?store.path(), "ignoring checklist file; starting empty");
        return Ok(Checklist::new());
    }
    Ok(store.load()?)
}

/// Workers the day starts from: the configured startup workers, or the
/// weather download when none are configured.
fn start_workers(config: &Config) -> Vec<WorkerName> {
    let mut starts: Vec<WorkerName> = config.manager.startup.iter().map(|s| s.worker).collect();
    if starts.is_empty() {
        starts.push(WorkerName::DownloadWeather);
    }
    if !config.run.hindcast_hosts.is_empty() && !starts.contains(&WorkerName::RunNemoHindcast) {
        starts.push(WorkerName::RunNemoHindcast);
    }
    starts
}

/// Simple dry-run output: print hosts, run types and the worker graph.
fn print_dry_run(config: &Config) {
    println!("nowcast dry-run");
    println!("  checklist_file = {:?}", config.manager.checklist_file);
    println!("  cloud_host = {:?}", config.run.cloud_host);
    println!();

    println!("enabled hosts ({}):", config.run.enabled_hosts.len());
    for (name, host) in &config.run.enabled_hosts {
        println!("  - {name}");
        println!("      run_types: {:?}", host.run_types);
        if host.shared_storage {
            println!("      shared_storage: true");
        }
        if host.make_forcing_links {
            println!("      make_forcing_links: true");
        }
    }
    if !config.run.hindcast_hosts.is_empty() {
        println!(
            "hindcast hosts: {:?}",
            config.run.hindcast_hosts.keys().collect::<Vec<_>>()
        );
    }
    if let Some(waves) = &config.wave_forecasts {
        println!("wave forecasts: {} ({})", waves.host, waves.run_when);
    }
    if let Some(fvcom) = &config.vhfr_fvcom_runs {
        println!("fvcom runs: {}", fvcom.host);
    }
    println!();

    let starts = start_workers(config);
    let reachable = graph::reachable_from(&starts);
    println!("workers reachable from {starts:?} ({}):", reachable.len());
    for worker in reachable {
        let next = graph::successors(worker);
        if next.is_empty() {
            println!("  - {worker}");
        } else {
            let next: Vec<String> = next.iter().map(ToString::to_string).collect();
            println!("  - {worker} -> {}", next.join(", "));
        }
    }

    debug!("dry-run complete (no launches)");
}
