// src/next_workers/fvcom.rs

//! VHFR FVCOM runs, nested inside the NEMO nowcast and forecast.
//!
//! Everything here is skipped when `[vhfr_fvcom_runs]` is not configured.

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::{Decision, payload_str, success_detail};
use crate::worker::{NextWorker, WorkerName};

/// Checklist namespace written by `run_fvcom` / `watch_fvcom`.
pub const FVCOM_RUN: &str = "FVCOM run";

/// Run type of a successful message from `worker`, or `None` when nothing
/// should follow.
fn fvcom_success<'m>(
    worker: WorkerName,
    msg: &'m Message,
    config: &'m Config,
) -> Result<Option<(&'m str, &'m str)>, crate::next_workers::DecisionError> {
    let detail = success_detail(worker, msg, config)?;
    let run_type = detail.and_then(|d| d.run_type.as_deref());
    Ok(run_type.zip(config.vhfr_fvcom_runs.as_ref().map(|f| f.host.as_str())))
}

pub fn after_make_fvcom_boundary(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = fvcom_success(WorkerName::MakeFvcomBoundary, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(vec![
        NextWorker::new(WorkerName::RunFvcom)
            .args([host, run_type])
            .on_host(host),
    ])
}

pub fn after_run_fvcom(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = fvcom_success(WorkerName::RunFvcom, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(vec![
        NextWorker::new(WorkerName::WatchFvcom)
            .args([host, run_type])
            .on_host(host),
    ])
}

pub fn after_watch_fvcom(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = fvcom_success(WorkerName::WatchFvcom, msg, config)? else {
        return Ok(Vec::new());
    };
    let run_date = payload_str(WorkerName::WatchFvcom, msg, &[run_type, "run date"])?;
    Ok(vec![
        NextWorker::new(WorkerName::DownloadFvcomResults).args([host, run_type, "--run-date", run_date]),
    ])
}

pub fn after_download_fvcom_results(msg: &Message, config: &Config, checklist: &Checklist) -> Decision {
    let Some((run_type, _host)) = fvcom_success(WorkerName::DownloadFvcomResults, msg, config)? else {
        return Ok(Vec::new());
    };
    let run_date = checklist.try_get_str(FVCOM_RUN, &[run_type, "run date"])?;
    Ok(vec![
        NextWorker::new(WorkerName::MakePlots).args(["fvcom", run_type, "publish", "--run-date", run_date]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgType;
    use crate::next_workers::test_support::{CONFIG, config, config_from};
    use serde_json::json;

    #[test]
    fn fvcom_chain_runs_on_configured_host() {
        let config = config();
        let checklist = Checklist::new();

        let m = Message::new(WorkerName::MakeFvcomBoundary, MsgType::success("nowcast"));
        assert_eq!(
            after_make_fvcom_boundary(&m, &config, &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::RunFvcom)
                .args(["west.cloud", "nowcast"])
                .on_host("west.cloud")]
        );

        let m = Message::new(WorkerName::RunFvcom, MsgType::success("nowcast"));
        assert_eq!(after_run_fvcom(&m, &config, &checklist).unwrap()[0].worker, WorkerName::WatchFvcom);

        let m = Message::new(WorkerName::WatchFvcom, MsgType::success("forecast"))
            .with_payload(json!({"forecast": {"host": "west.cloud", "run date": "2018-01-20"}}));
        assert_eq!(
            after_watch_fvcom(&m, &config, &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::DownloadFvcomResults).args([
                "west.cloud",
                "forecast",
                "--run-date",
                "2018-01-20"
            ])]
        );
    }

    #[test]
    fn fvcom_plots_use_checklist_run_date() {
        let mut checklist = Checklist::new();
        checklist.update(FVCOM_RUN, json!({"nowcast": {"run date": "2018-01-19"}}));
        let m = Message::new(WorkerName::DownloadFvcomResults, MsgType::success("nowcast"));
        assert_eq!(
            after_download_fvcom_results(&m, &config(), &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::MakePlots).args([
                "fvcom",
                "nowcast",
                "publish",
                "--run-date",
                "2018-01-19"
            ])]
        );
    }

    #[test]
    fn unconfigured_fvcom_schedules_nothing() {
        let config = config_from(&CONFIG.replace("[vhfr_fvcom_runs]\nhost = \"west.cloud\"", ""));
        let m = Message::new(WorkerName::MakeFvcomBoundary, MsgType::success("nowcast"));
        assert!(after_make_fvcom_boundary(&m, &config, &Checklist::new()).unwrap().is_empty());
    }
}
