// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::worker::{LOCALHOST, WorkerName};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [manager]
/// checklist_file = "nowcast_checklist.json"
/// startup = [{ worker = "download_weather", args = ["06"] }]
///
/// [run]
/// cloud_host = "west.cloud"
///
/// [run.enabled_hosts."west.cloud"]
/// run_types = ["nowcast", "forecast", "forecast2", "nowcast-green"]
/// shared_storage = false
/// make_forcing_links = true
/// ssh_key = "SalishSeaNEMO-nowcast_id_rsa"
///
/// [run_types.nowcast]
/// config_name = "SalishSea"
///
/// [wave_forecasts]
/// host = "west.cloud"
/// run_when = "after nowcast-green"
/// ```
///
/// `wave_forecasts` and `vhfr_fvcom_runs` are optional; leaving one out turns
/// the corresponding part of the workflow off.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub manager: ManagerSection,

    pub run: RunSection,

    /// Run type definitions from `[run_types.<name>]`.
    #[serde(default)]
    pub run_types: BTreeMap<String, RunTypeConfig>,

    #[serde(default)]
    pub wave_forecasts: Option<WaveForecasts>,

    #[serde(default)]
    pub vhfr_fvcom_runs: Option<FvcomRuns>,

    #[serde(default)]
    pub observations: Observations,
}

/// Validated configuration.
///
/// Built with `Config::try_from(raw)`; see `validate.rs`. Read-only for the
/// lifetime of the manager.
#[derive(Debug, Clone)]
pub struct Config {
    pub manager: ManagerSection,
    pub run: RunSection,
    pub run_types: BTreeMap<String, RunTypeConfig>,
    pub wave_forecasts: Option<WaveForecasts>,
    pub vhfr_fvcom_runs: Option<FvcomRuns>,
    pub observations: Observations,
}

impl Config {
    pub(crate) fn new_unchecked(raw: RawConfig) -> Self {
        Self {
            manager: raw.manager,
            run: raw.run,
            run_types: raw.run_types,
            wave_forecasts: raw.wave_forecasts,
            vhfr_fvcom_runs: raw.vhfr_fvcom_runs,
            observations: raw.observations,
        }
    }

    /// Look a host up in the enabled hosts, then the hindcast hosts.
    pub fn host(&self, name: &str) -> Option<&HostConfig> {
        self.run
            .enabled_hosts
            .get(name)
            .or_else(|| self.run.hindcast_hosts.get(name))
    }

    /// Whether `run_type` is enabled on the enabled host `host`.
    pub fn host_runs(&self, host: &str, run_type: &str) -> bool {
        self.run
            .enabled_hosts
            .get(host)
            .is_some_and(|h| h.run_types.iter().any(|rt| rt == run_type))
    }

    pub fn is_hindcast_host(&self, host: &str) -> bool {
        self.run.hindcast_hosts.contains_key(host)
    }

    pub fn is_cloud_host(&self, host: &str) -> bool {
        self.run.cloud_host.as_deref() == Some(host)
    }

    /// Whether wave forecasts are configured to start after `run_type`.
    pub fn waves_run_after(&self, run_type: &str) -> bool {
        self.wave_forecasts
            .as_ref()
            .and_then(|w| w.run_when.strip_prefix("after "))
            .is_some_and(|after| after == run_type)
    }
}

/// `[manager]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerSection {
    /// Where the checklist is persisted (pretty-printed JSON).
    #[serde(default = "default_checklist_file")]
    pub checklist_file: PathBuf,

    /// Interpreter used for local workers and for remote hosts that do not
    /// set their own.
    #[serde(default = "default_python")]
    pub python: String,

    /// Workers launched when the manager starts.
    #[serde(default)]
    pub startup: Vec<StartupWorker>,
}

fn default_checklist_file() -> PathBuf {
    PathBuf::from("nowcast_checklist.json")
}

fn default_python() -> String {
    "python3".to_string()
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            checklist_file: default_checklist_file(),
            python: default_python(),
            startup: Vec::new(),
        }
    }
}

/// One entry of `manager.startup`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupWorker {
    pub worker: WorkerName,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String {
    LOCALHOST.to_string()
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Hosts that run the daily NEMO runs, keyed by host name.
    pub enabled_hosts: BTreeMap<String, HostConfig>,

    /// Hosts that run continuous hindcasts.
    #[serde(default)]
    pub hindcast_hosts: BTreeMap<String, HostConfig>,

    /// Enabled host whose run/watch workers relay their logs to the manager.
    #[serde(default)]
    pub cloud_host: Option<String>,
}

/// `[run.enabled_hosts.<host>]` / `[run.hindcast_hosts.<host>]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub run_types: Vec<String>,

    /// Forcing files are visible to this host without uploading.
    #[serde(default)]
    pub shared_storage: bool,

    /// Whether forcing symlinks are made for this host.
    #[serde(default)]
    pub make_forcing_links: bool,

    #[serde(default)]
    pub ssh_key: Option<String>,

    /// Remote interpreter; falls back to `manager.python`.
    #[serde(default)]
    pub python: Option<String>,

    /// Config file path on the remote host; falls back to the manager's own.
    #[serde(default)]
    pub config_file: Option<String>,
}

/// `[run_types.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunTypeConfig {
    pub config_name: String,

    /// Run duration in days.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// `[wave_forecasts]`.
#[derive(Debug, Clone, Deserialize)]
pub struct WaveForecasts {
    pub host: String,
    /// `"after <run type>"`.
    pub run_when: String,
}

/// `[vhfr_fvcom_runs]`.
#[derive(Debug, Clone, Deserialize)]
pub struct FvcomRuns {
    pub host: String,
}

/// `[observations]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Observations {
    #[serde(default)]
    pub ctd_data: CtdData,
    #[serde(default)]
    pub ferry_data: FerryData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CtdData {
    #[serde(default)]
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FerryData {
    #[serde(default)]
    pub ferries: Vec<String>,
}
