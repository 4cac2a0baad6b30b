#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use nowcast::config::{
    Config, FvcomRuns, HostConfig, ManagerSection, Observations, RawConfig, RunSection,
    RunTypeConfig, StartupWorker, WaveForecasts,
};
use nowcast::errors::Result;
use nowcast::worker::{LOCALHOST, WorkerName};

/// Builder for `Config` to simplify test setup.
///
/// Run types used by any host are declared automatically.
pub struct ConfigBuilder {
    config: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfig {
                manager: ManagerSection::default(),
                run: RunSection {
                    enabled_hosts: BTreeMap::new(),
                    hindcast_hosts: BTreeMap::new(),
                    cloud_host: None,
                },
                run_types: BTreeMap::new(),
                wave_forecasts: None,
                vhfr_fvcom_runs: None,
                observations: Observations::default(),
            },
        }
    }

    pub fn with_host(mut self, name: &str, host: HostConfig) -> Self {
        for run_type in &host.run_types {
            self.config
                .run_types
                .entry(run_type.clone())
                .or_insert_with(|| RunTypeConfig {
                    config_name: "SalishSea".to_string(),
                    duration: None,
                });
        }
        self.config.run.enabled_hosts.insert(name.to_string(), host);
        self
    }

    pub fn with_hindcast_host(mut self, name: &str) -> Self {
        self.config
            .run
            .hindcast_hosts
            .insert(name.to_string(), HostConfig::default());
        self
    }

    pub fn with_cloud_host(mut self, name: &str) -> Self {
        self.config.run.cloud_host = Some(name.to_string());
        self
    }

    pub fn with_waves(mut self, host: &str, after_run_type: &str) -> Self {
        self.config.wave_forecasts = Some(WaveForecasts {
            host: host.to_string(),
            run_when: format!("after {after_run_type}"),
        });
        self
    }

    pub fn with_fvcom(mut self, host: &str) -> Self {
        self.config.vhfr_fvcom_runs = Some(FvcomRuns {
            host: host.to_string(),
        });
        self
    }

    pub fn with_ctd_station(mut self, station: &str) -> Self {
        self.config
            .observations
            .ctd_data
            .stations
            .push(station.to_string());
        self
    }

    pub fn with_ferry(mut self, ferry: &str) -> Self {
        self.config
            .observations
            .ferry_data
            .ferries
            .push(ferry.to_string());
        self
    }

    pub fn with_startup(mut self, worker: WorkerName, args: &[&str]) -> Self {
        self.config.manager.startup.push(StartupWorker {
            worker,
            args: args.iter().map(|a| a.to_string()).collect(),
            host: LOCALHOST.to_string(),
        });
        self
    }

    pub fn with_checklist_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.manager.checklist_file = path.into();
        self
    }

    pub fn raw(self) -> RawConfig {
        self.config
    }

    pub fn try_build(self) -> Result<Config> {
        Config::try_from(self.config)
    }

    pub fn build(self) -> Config {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `HostConfig`.
pub struct HostBuilder {
    host: HostConfig,
}

impl HostBuilder {
    pub fn new(run_types: &[&str]) -> Self {
        Self {
            host: HostConfig {
                run_types: run_types.iter().map(|rt| rt.to_string()).collect(),
                ..HostConfig::default()
            },
        }
    }

    pub fn shared_storage(mut self, val: bool) -> Self {
        self.host.shared_storage = val;
        self
    }

    pub fn make_forcing_links(mut self, val: bool) -> Self {
        self.host.make_forcing_links = val;
        self
    }

    pub fn ssh_key(mut self, key: &str) -> Self {
        self.host.ssh_key = Some(key.to_string());
        self
    }

    pub fn build(self) -> HostConfig {
        self.host
    }
}

/// The production-like layout: one cloud host running the daily runs with
/// links, waves after nowcast-green, FVCOM on the same host.
pub fn daily_config() -> Config {
    ConfigBuilder::new()
        .with_host(
            "west.cloud",
            HostBuilder::new(&["nowcast", "forecast", "forecast2", "nowcast-green"])
                .make_forcing_links(true)
                .build(),
        )
        .with_cloud_host("west.cloud")
        .with_waves("west.cloud", "nowcast-green")
        .with_fvcom("west.cloud")
        .with_ctd_station("SCVIP")
        .with_ferry("TWDP")
        .build()
}
