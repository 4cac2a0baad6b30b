// src/next_workers/registry.rs

//! The message types each worker may send.
//!
//! A type outside a worker's registry is a programming error in that worker
//! or in this table; [`check`] reports it rather than guessing.

use crate::config::Config;
use crate::message::MsgType;
use crate::next_workers::DecisionError;
use crate::worker::WorkerName;

pub const NEMO_RUN_TYPES: &[&str] = &["nowcast", "nowcast-green", "nowcast-dev", "forecast", "forecast2"];
pub const NOWCAST_RUN_TYPES: &[&str] = &["nowcast", "nowcast-green", "nowcast-dev"];
pub const FORECAST_RUN_TYPES: &[&str] = &["forecast", "forecast2"];
pub const FVCOM_RUN_TYPES: &[&str] = &["nowcast", "forecast"];
pub const WAVE_RUN_TYPES: &[&str] = &["forecast", "forecast2"];

/// Plot / page types made after a nowcast family run.
pub const NOWCAST_PAGES: &[&str] = &["research", "comparison"];

const WEATHER_CYCLES: &[&str] = &["00", "06", "12", "18"];
const ERDDAP_DATASETS: &[&str] = &["weather", "nowcast-green"];

/// `crash` plus `failure <v>` / `success <v>` for every variant.
fn outcomes<I, S>(variants: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut types = vec!["crash".to_string()];
    for v in variants {
        let v = v.as_ref();
        types.push(format!("failure {v}"));
        types.push(format!("success {v}"));
    }
    types
}

/// `crash`, bare `failure` and bare `success`.
fn plain() -> Vec<String> {
    ["crash", "failure", "success"].map(String::from).to_vec()
}

/// `<run type> <stage>` for each NEMO run type and the pages it gets.
fn nemo_pages() -> Vec<String> {
    let mut pages = Vec::new();
    for rt in NOWCAST_RUN_TYPES {
        for page in NOWCAST_PAGES {
            pages.push(format!("{rt} {page}"));
        }
    }
    for rt in FORECAST_RUN_TYPES {
        pages.push(format!("{rt} publish"));
    }
    pages
}

fn plot_types() -> Vec<String> {
    let mut plots: Vec<String> = nemo_pages().into_iter().map(|p| format!("nemo {p}")).collect();
    plots.extend(FVCOM_RUN_TYPES.iter().map(|rt| format!("fvcom {rt} publish")));
    plots.extend(WAVE_RUN_TYPES.iter().map(|rt| format!("wwatch3 {rt} publish")));
    plots
}

/// Every message type `worker` may send, in wire form.
pub fn msg_types(worker: WorkerName, config: &Config) -> Vec<String> {
    use WorkerName::*;
    let obs = &config.observations;
    match worker {
        DownloadWeather => outcomes(WEATHER_CYCLES),
        GetNeahBaySsh => outcomes(["nowcast", "forecast", "forecast2"]),
        GribToNetcdf => outcomes(["nowcast+", "forecast2"]),
        UploadForcing => outcomes(["nowcast+", "forecast2", "ssh", "turbidity"]),
        MakeForcingLinks => outcomes(["nowcast+", "forecast2", "ssh", "nowcast-green"]),
        GetOncCtd => outcomes(&obs.ctd_data.stations),
        GetOncFerry => outcomes(&obs.ferry_data.ferries),
        PingErddap => {
            let mut datasets: Vec<String> = ERDDAP_DATASETS.iter().map(|d| d.to_string()).collect();
            datasets.extend(obs.ctd_data.stations.iter().map(|s| format!("{s}-CTD")));
            datasets.extend(obs.ferry_data.ferries.iter().map(|f| format!("{f}-ferry")));
            outcomes(datasets)
        }
        RunNemo | WatchNemo => outcomes(NEMO_RUN_TYPES),
        DownloadResults => outcomes(NEMO_RUN_TYPES.iter().chain(&["hindcast"])),
        SplitResults => outcomes(["hindcast"]),
        MakeFvcomBoundary | RunFvcom | WatchFvcom | DownloadFvcomResults => {
            outcomes(FVCOM_RUN_TYPES)
        }
        MakeWw3WindFile | MakeWw3CurrentFile | RunWw3 | WatchWw3 | DownloadWwatch3Results => {
            outcomes(WAVE_RUN_TYPES)
        }
        MakePlots => outcomes(plot_types()),
        MakeFeeds => outcomes(FORECAST_RUN_TYPES),
        MakeSitePage => outcomes(nemo_pages()),
        MakeRunoffFile | DownloadLiveOcean | MakeLiveOceanFiles | MakeTurbidityFile
        | RunNemoHindcast | WatchNemoHindcast | PushToWeb | ClearChecklist | RotateLogs => plain(),
    }
}

/// Fail unless `msg_type` is registered for `worker`.
pub fn check(worker: WorkerName, msg_type: &MsgType, config: &Config) -> Result<(), DecisionError> {
    let wire = msg_type.to_string();
    if msg_types(worker, config).iter().any(|t| *t == wire) {
        Ok(())
    } else {
        Err(DecisionError::UnknownMsgType {
            worker,
            msg_type: wire,
        })
    }
}
