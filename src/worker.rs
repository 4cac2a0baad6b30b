// src/worker.rs

//! Worker identities and the `NextWorker` launch descriptor.
//!
//! Every worker the manager knows about is a variant of [`WorkerName`], so
//! an unregistered worker is a compile-time error inside the crate and a
//! parse error at the message boundary.

use std::fmt;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumIter, EnumString};

/// Host name used for workers that run on the manager's own machine.
pub const LOCALHOST: &str = "localhost";

/// Package that holds the worker modules.
const WORKER_PACKAGE: &str = "nowcast.workers";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum WorkerName {
    #[strum(serialize = "download_weather")]
    DownloadWeather,
    #[strum(serialize = "get_NeahBay_ssh")]
    GetNeahBaySsh,
    #[strum(serialize = "grib_to_netcdf")]
    GribToNetcdf,
    #[strum(serialize = "make_runoff_file")]
    MakeRunoffFile,
    #[strum(serialize = "get_onc_ctd")]
    GetOncCtd,
    #[strum(serialize = "get_onc_ferry")]
    GetOncFerry,
    #[strum(serialize = "download_live_ocean")]
    DownloadLiveOcean,
    #[strum(serialize = "make_live_ocean_files")]
    MakeLiveOceanFiles,
    #[strum(serialize = "make_turbidity_file")]
    MakeTurbidityFile,
    #[strum(serialize = "upload_forcing")]
    UploadForcing,
    #[strum(serialize = "make_forcing_links")]
    MakeForcingLinks,
    #[strum(serialize = "run_NEMO")]
    RunNemo,
    #[strum(serialize = "watch_NEMO")]
    WatchNemo,
    #[strum(serialize = "run_NEMO_hindcast")]
    RunNemoHindcast,
    #[strum(serialize = "watch_NEMO_hindcast")]
    WatchNemoHindcast,
    #[strum(serialize = "download_results")]
    DownloadResults,
    #[strum(serialize = "split_results")]
    SplitResults,
    #[strum(serialize = "make_fvcom_boundary")]
    MakeFvcomBoundary,
    #[strum(serialize = "run_fvcom")]
    RunFvcom,
    #[strum(serialize = "watch_fvcom")]
    WatchFvcom,
    #[strum(serialize = "download_fvcom_results")]
    DownloadFvcomResults,
    #[strum(serialize = "make_ww3_wind_file")]
    MakeWw3WindFile,
    #[strum(serialize = "make_ww3_current_file")]
    MakeWw3CurrentFile,
    #[strum(serialize = "run_ww3")]
    RunWw3,
    #[strum(serialize = "watch_ww3")]
    WatchWw3,
    #[strum(serialize = "download_wwatch3_results")]
    DownloadWwatch3Results,
    #[strum(serialize = "make_plots")]
    MakePlots,
    #[strum(serialize = "make_feeds")]
    MakeFeeds,
    #[strum(serialize = "ping_erddap")]
    PingErddap,
    #[strum(serialize = "make_site_page")]
    MakeSitePage,
    #[strum(serialize = "push_to_web")]
    PushToWeb,
    #[strum(serialize = "clear_checklist")]
    ClearChecklist,
    #[strum(serialize = "rotate_logs")]
    RotateLogs,
}

impl WorkerName {
    /// Fully qualified module the launcher runs, e.g. `nowcast.workers.run_NEMO`.
    pub fn module(self) -> String {
        format!("{WORKER_PACKAGE}.{self}")
    }

    /// Checklist namespace under which this worker's success payload is recorded.
    pub fn checklist_namespace(self) -> &'static str {
        use WorkerName::*;
        match self {
            DownloadWeather => "weather forecast",
            GetNeahBaySsh => "Neah Bay ssh",
            GribToNetcdf => "weather forcing",
            MakeRunoffFile => "rivers",
            GetOncCtd => "ONC CTD data",
            GetOncFerry => "ONC ferry data",
            DownloadLiveOcean => "Live Ocean products",
            MakeLiveOceanFiles => "Live Ocean boundary conditions",
            MakeTurbidityFile => "turbidity forcing",
            UploadForcing => "forcing upload",
            MakeForcingLinks => "forcing links",
            RunNemo | WatchNemo | RunNemoHindcast | WatchNemoHindcast => "NEMO run",
            DownloadResults => "results files",
            SplitResults => "results splitting",
            MakeFvcomBoundary => "FVCOM boundary",
            RunFvcom | WatchFvcom => "FVCOM run",
            DownloadFvcomResults => "FVCOM results files",
            MakeWw3WindFile => "WW3 wind forcing",
            MakeWw3CurrentFile => "WW3 current forcing",
            RunWw3 | WatchWw3 => "WWATCH3 run",
            DownloadWwatch3Results => "WWATCH3 results files",
            MakePlots => "plots",
            MakeFeeds => "Atom feeds",
            PingErddap => "ERDDAP flag files",
            MakeSitePage => "salishsea site pages",
            PushToWeb => "push to salishsea site",
            ClearChecklist => "checklist cleared",
            RotateLogs => "log rotation",
        }
    }
}

/// Declarative description of a worker launch.
///
/// Equality is structural; two descriptors with the same worker, args and
/// host describe the same launch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NextWorker {
    pub worker: WorkerName,
    pub args: Vec<String>,
    pub host: String,
}

impl NextWorker {
    /// A worker with no args on `localhost`.
    pub fn new(worker: WorkerName) -> Self {
        Self {
            worker,
            args: Vec::new(),
            host: LOCALHOST.to_string(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn is_local(&self) -> bool {
        self.host == LOCALHOST
    }
}

impl fmt::Display for NextWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.worker)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, " @ {}", self.host)
    }
}
