// src/next_workers/mod.rs

//! The next-worker decision table.
//!
//! One pure function per worker, `after_<worker>(msg, config, checklist)`,
//! returns the ordered list of workers to launch after that worker reports.
//! Crash and failure messages always yield nothing; the operator restarts
//! by hand.
//!
//! - [`registry`] lists the message types each worker may send.
//! - [`forcing`], [`observations`], [`nemo`], [`fvcom`], [`wwatch3`] and
//!   [`publish`] hold the decision functions, grouped by pipeline stage.
//! - [`graph`] declares the edges those functions can produce.

use serde_json::Value;
use thiserror::Error;

use crate::checklist::{Checklist, MissingEntry};
use crate::config::Config;
use crate::message::{Message, MsgDetail, MsgType};
use crate::worker::{NextWorker, WorkerName};

pub mod forcing;
pub mod fvcom;
pub mod graph;
pub mod nemo;
pub mod observations;
pub mod publish;
pub mod registry;
pub mod wwatch3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// The worker's message registry does not list this type.
    #[error("{worker} has no message type '{msg_type}'")]
    UnknownMsgType { worker: WorkerName, msg_type: String },

    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(#[from] MissingEntry),

    /// A success payload lacks a key the decision needs.
    #[error("'{msg_type}' payload from {worker} has no '{key}'")]
    MissingPayload {
        worker: WorkerName,
        msg_type: String,
        key: String,
    },

    #[error("run id '{0}' does not start with a DDMMMYY date")]
    BadRunId(String),
}

/// Result of a decision function.
pub type Decision = Result<Vec<NextWorker>, DecisionError>;

/// Decide what follows `msg`, dispatching on the worker that sent it.
pub fn after(msg: &Message, config: &Config, checklist: &Checklist) -> Decision {
    use WorkerName::*;
    match msg.source {
        DownloadWeather => forcing::after_download_weather(msg, config, checklist),
        GetNeahBaySsh => forcing::after_get_neah_bay_ssh(msg, config, checklist),
        GribToNetcdf => forcing::after_grib_to_netcdf(msg, config, checklist),
        MakeRunoffFile => forcing::after_make_runoff_file(msg, config, checklist),
        DownloadLiveOcean => forcing::after_download_live_ocean(msg, config, checklist),
        MakeLiveOceanFiles => forcing::after_make_live_ocean_files(msg, config, checklist),
        MakeTurbidityFile => forcing::after_make_turbidity_file(msg, config, checklist),
        UploadForcing => forcing::after_upload_forcing(msg, config, checklist),
        MakeForcingLinks => forcing::after_make_forcing_links(msg, config, checklist),
        GetOncCtd => observations::after_get_onc_ctd(msg, config, checklist),
        GetOncFerry => observations::after_get_onc_ferry(msg, config, checklist),
        PingErddap => observations::after_ping_erddap(msg, config, checklist),
        RunNemo => nemo::after_run_nemo(msg, config, checklist),
        WatchNemo => nemo::after_watch_nemo(msg, config, checklist),
        RunNemoHindcast => nemo::after_run_nemo_hindcast(msg, config, checklist),
        WatchNemoHindcast => nemo::after_watch_nemo_hindcast(msg, config, checklist),
        DownloadResults => nemo::after_download_results(msg, config, checklist),
        SplitResults => nemo::after_split_results(msg, config, checklist),
        MakeFvcomBoundary => fvcom::after_make_fvcom_boundary(msg, config, checklist),
        RunFvcom => fvcom::after_run_fvcom(msg, config, checklist),
        WatchFvcom => fvcom::after_watch_fvcom(msg, config, checklist),
        DownloadFvcomResults => fvcom::after_download_fvcom_results(msg, config, checklist),
        MakeWw3WindFile => wwatch3::after_make_ww3_wind_file(msg, config, checklist),
        MakeWw3CurrentFile => wwatch3::after_make_ww3_current_file(msg, config, checklist),
        RunWw3 => wwatch3::after_run_ww3(msg, config, checklist),
        WatchWw3 => wwatch3::after_watch_ww3(msg, config, checklist),
        DownloadWwatch3Results => wwatch3::after_download_wwatch3_results(msg, config, checklist),
        MakePlots => publish::after_make_plots(msg, config, checklist),
        MakeFeeds => publish::after_make_feeds(msg, config, checklist),
        MakeSitePage => publish::after_make_site_page(msg, config, checklist),
        PushToWeb => publish::after_push_to_web(msg, config, checklist),
        ClearChecklist => publish::after_clear_checklist(msg, config, checklist),
        RotateLogs => publish::after_rotate_logs(msg, config, checklist),
    }
}

/// Check `msg` against `worker`'s registry and return its success detail.
///
/// `Ok(None)` means crash or failure: nothing follows.
pub(crate) fn success_detail<'m>(
    worker: WorkerName,
    msg: &'m Message,
    config: &Config,
) -> Result<Option<&'m MsgDetail>, DecisionError> {
    registry::check(worker, &msg.msg_type, config)?;
    match &msg.msg_type {
        MsgType::Success(detail) => Ok(Some(detail)),
        MsgType::Crash | MsgType::Failure(_) => Ok(None),
    }
}

/// The only key of an object payload, typically a host name.
pub(crate) fn sole_key(payload: &Value) -> Option<&str> {
    payload
        .as_object()
        .and_then(|obj| obj.keys().next())
        .map(String::as_str)
}

/// String at `path` in the message payload.
pub(crate) fn payload_str<'m>(
    worker: WorkerName,
    msg: &'m Message,
    path: &[&str],
) -> Result<&'m str, DecisionError> {
    let mut value = &msg.payload;
    for key in path {
        value = value.get(*key).ok_or_else(|| missing_payload(worker, msg, key))?;
    }
    value.as_str().ok_or_else(|| {
        missing_payload(worker, msg, path.last().copied().unwrap_or("payload"))
    })
}

fn missing_payload(worker: WorkerName, msg: &Message, key: &str) -> DecisionError {
    DecisionError::MissingPayload {
        worker,
        msg_type: msg.msg_type.to_string(),
        key: key.to_string(),
    }
}
