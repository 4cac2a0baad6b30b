// src/next_workers/nemo.rs

//! NEMO runs: launch, watch, results download, and the continuous hindcast.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::registry::{FORECAST_RUN_TYPES, NOWCAST_RUN_TYPES};
use crate::next_workers::{Decision, DecisionError, payload_str, success_detail};
use crate::worker::{NextWorker, WorkerName};

/// Checklist namespace written by the run and watch workers.
pub const NEMO_RUN: &str = "NEMO run";

const HINDCAST: &str = "hindcast";

static RUN_ID_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}[A-Za-z]{3}\d{2})").expect("run id pattern is valid"));

/// Date encoded in the `DDMMMYY` prefix of a run id such as `11mar18hindcast`.
pub fn run_id_date(run_id: &str) -> Result<NaiveDate, DecisionError> {
    let bad = || DecisionError::BadRunId(run_id.to_string());
    let caps = RUN_ID_DATE.captures(run_id).ok_or_else(bad)?;
    NaiveDate::parse_from_str(&caps[1], "%d%b%y").map_err(|_| bad())
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn after_run_nemo(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::RunNemo, msg, config)? else {
        return Ok(Vec::new());
    };
    let Some(run_type) = detail.run_type.as_deref() else {
        return Ok(Vec::new());
    };

    let host = payload_str(WorkerName::RunNemo, msg, &[run_type, "host"])?;
    Ok(vec![
        NextWorker::new(WorkerName::WatchNemo)
            .args([host, run_type])
            .on_host(host),
    ])
}

/// Successors of a finished NEMO run, primary first:
///
/// 1. nowcast: forecast sea surface height, then FVCOM boundary files;
/// 2. wave forcing: the forecast2 wave run follows forecast2 whenever waves
///    are configured; the forecast wave run follows the configured
///    `run_when` run type, otherwise the forecast makes turbidity forcing;
/// 3. results download, always last.
pub fn after_watch_nemo(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::WatchNemo, msg, config)? else {
        return Ok(Vec::new());
    };
    let Some(run_type) = detail.run_type.as_deref() else {
        return Ok(Vec::new());
    };
    let host = payload_str(WorkerName::WatchNemo, msg, &[run_type, "host"])?;
    let run_date = payload_str(WorkerName::WatchNemo, msg, &[run_type, "run date"])?;

    let mut next = Vec::new();

    if run_type == "nowcast" {
        next.push(NextWorker::new(WorkerName::GetNeahBaySsh).args(["forecast"]));
    }

    if let Some(fvcom) = config.vhfr_fvcom_runs.as_ref() {
        if run_type == "nowcast" || run_type == "forecast" {
            next.push(
                NextWorker::new(WorkerName::MakeFvcomBoundary)
                    .args([fvcom.host.as_str(), run_type])
                    .on_host(fvcom.host.as_str()),
            );
        }
    }

    match config.wave_forecasts.as_ref() {
        Some(waves) if run_type == "forecast2" || config.waves_run_after(run_type) => {
            let wave_run_type = if run_type == "forecast2" { "forecast2" } else { "forecast" };
            for worker in [WorkerName::MakeWw3WindFile, WorkerName::MakeWw3CurrentFile] {
                next.push(
                    NextWorker::new(worker)
                        .args([waves.host.as_str(), wave_run_type])
                        .on_host(waves.host.as_str()),
                );
            }
        }
        _ if run_type == "forecast" => {
            next.push(NextWorker::new(WorkerName::MakeTurbidityFile));
        }
        _ => {}
    }

    next.push(
        NextWorker::new(WorkerName::DownloadResults).args([host, run_type, "--run-date", run_date]),
    );
    Ok(next)
}

pub fn after_run_nemo_hindcast(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    if success_detail(WorkerName::RunNemoHindcast, msg, config)?.is_none() {
        return Ok(Vec::new());
    }
    let host = payload_str(WorkerName::RunNemoHindcast, msg, &[HINDCAST, "host"])?;
    if !config.is_hindcast_host(host) {
        return Ok(Vec::new());
    }
    Ok(vec![NextWorker::new(WorkerName::WatchNemoHindcast).args([host])])
}

/// A finished hindcast segment is downloaded and the next segment queued.
pub fn after_watch_nemo_hindcast(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    if success_detail(WorkerName::WatchNemoHindcast, msg, config)?.is_none() {
        return Ok(Vec::new());
    }
    let host = payload_str(WorkerName::WatchNemoHindcast, msg, &[HINDCAST, "host"])?;
    if !config.is_hindcast_host(host) {
        return Ok(Vec::new());
    }
    let run_id = payload_str(WorkerName::WatchNemoHindcast, msg, &[HINDCAST, "run id"])?;
    let run_date = iso(run_id_date(run_id)?);

    Ok(vec![
        NextWorker::new(WorkerName::DownloadResults).args([host, HINDCAST, "--run-date", run_date.as_str()]),
        NextWorker::new(WorkerName::RunNemoHindcast).args([host]),
    ])
}

/// Run dates come from the checklist: the download worker's own payload
/// only lists files.
pub fn after_download_results(msg: &Message, config: &Config, checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::DownloadResults, msg, config)? else {
        return Ok(Vec::new());
    };
    let Some(run_type) = detail.run_type.as_deref() else {
        return Ok(Vec::new());
    };

    if run_type == HINDCAST {
        let run_id = checklist.try_get_str(NEMO_RUN, &[HINDCAST, "run id"])?;
        let run_date = iso(run_id_date(run_id)?);
        return Ok(vec![
            NextWorker::new(WorkerName::SplitResults).args([HINDCAST, run_date.as_str()]),
        ]);
    }

    let run_date = checklist.try_get_str(NEMO_RUN, &[run_type, "run date"])?;
    let plots = |plot_type: &str| {
        NextWorker::new(WorkerName::MakePlots).args([
            "nemo",
            run_type,
            plot_type,
            "--run-date",
            run_date,
        ])
    };

    let mut next = Vec::new();
    if NOWCAST_RUN_TYPES.contains(&run_type) {
        next.push(plots("research"));
        if run_type == "nowcast" {
            next.push(plots("comparison"));
        }
        if run_type == "nowcast-green" {
            next.push(NextWorker::new(WorkerName::PingErddap).args(["nowcast-green"]));
        }
    } else if FORECAST_RUN_TYPES.contains(&run_type) {
        next.push(plots("publish"));
    }
    Ok(next)
}

pub fn after_split_results(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::SplitResults, msg, config)?;
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgType;
    use crate::next_workers::test_support::{CONFIG, config, config_from};
    use serde_json::json;

    fn watch_nemo(run_type: &str) -> Message {
        Message::new(WorkerName::WatchNemo, MsgType::success(run_type)).with_payload(json!({
            run_type: {"host": "west.cloud", "run date": "2018-01-20", "completed": true}
        }))
    }

    #[test]
    fn run_id_prefix_parses_as_date() {
        assert_eq!(
            run_id_date("11mar18hindcast").unwrap(),
            NaiveDate::from_ymd_opt(2018, 3, 11).unwrap()
        );
        assert_eq!(
            run_id_date("01Jan19hindcast").unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
        );
        assert!(matches!(run_id_date("hindcast"), Err(DecisionError::BadRunId(_))));
        assert!(run_id_date("32mar18hindcast").is_err());
    }

    #[test]
    fn run_nemo_success_starts_watcher_on_run_host() {
        let m = Message::new(WorkerName::RunNemo, MsgType::success("forecast2"))
            .with_payload(json!({"forecast2": {"host": "west.cloud", "run date": "2018-01-20"}}));
        assert_eq!(
            after_run_nemo(&m, &config(), &Checklist::new()).unwrap(),
            vec![NextWorker::new(WorkerName::WatchNemo)
                .args(["west.cloud", "forecast2"])
                .on_host("west.cloud")]
        );
    }

    #[test]
    fn run_nemo_success_without_host_is_an_error() {
        let m = Message::new(WorkerName::RunNemo, MsgType::success("nowcast"))
            .with_payload(json!({"nowcast": {}}));
        assert!(matches!(
            after_run_nemo(&m, &config(), &Checklist::new()),
            Err(DecisionError::MissingPayload { .. })
        ));
    }

    #[test]
    fn watch_nemo_nowcast_orders_primary_successors_first() {
        let next = after_watch_nemo(&watch_nemo("nowcast"), &config(), &Checklist::new()).unwrap();

        assert_eq!(next[0], NextWorker::new(WorkerName::GetNeahBaySsh).args(["forecast"]));
        assert_eq!(
            next[1],
            NextWorker::new(WorkerName::MakeFvcomBoundary)
                .args(["west.cloud", "nowcast"])
                .on_host("west.cloud")
        );
        assert_eq!(
            next.last().unwrap(),
            &NextWorker::new(WorkerName::DownloadResults).args([
                "west.cloud",
                "nowcast",
                "--run-date",
                "2018-01-20"
            ])
        );
    }

    #[test]
    fn watch_nemo_forecast_makes_turbidity_when_waves_run_later() {
        let next = after_watch_nemo(&watch_nemo("forecast"), &config(), &Checklist::new()).unwrap();
        assert!(next.contains(&NextWorker::new(WorkerName::MakeTurbidityFile)));
        assert!(!next.iter().any(|w| w.worker == WorkerName::MakeWw3WindFile));
    }

    #[test]
    fn watch_nemo_starts_waves_after_configured_run_type() {
        let next =
            after_watch_nemo(&watch_nemo("nowcast-green"), &config(), &Checklist::new()).unwrap();
        assert_eq!(
            next,
            vec![
                NextWorker::new(WorkerName::MakeWw3WindFile)
                    .args(["west.cloud", "forecast"])
                    .on_host("west.cloud"),
                NextWorker::new(WorkerName::MakeWw3CurrentFile)
                    .args(["west.cloud", "forecast"])
                    .on_host("west.cloud"),
                NextWorker::new(WorkerName::DownloadResults).args([
                    "west.cloud",
                    "nowcast-green",
                    "--run-date",
                    "2018-01-20"
                ]),
            ]
        );

        let after_forecast = CONFIG.replace("after nowcast-green", "after forecast");
        let next = after_watch_nemo(&watch_nemo("forecast"), &config_from(&after_forecast), &Checklist::new())
            .unwrap();
        assert!(next.iter().any(|w| w.worker == WorkerName::MakeWw3WindFile));
        assert!(!next.contains(&NextWorker::new(WorkerName::MakeTurbidityFile)));
    }

    #[test]
    fn watch_nemo_forecast2_starts_forecast2_waves() {
        let next = after_watch_nemo(&watch_nemo("forecast2"), &config(), &Checklist::new()).unwrap();
        assert_eq!(
            next,
            vec![
                NextWorker::new(WorkerName::MakeWw3WindFile)
                    .args(["west.cloud", "forecast2"])
                    .on_host("west.cloud"),
                NextWorker::new(WorkerName::MakeWw3CurrentFile)
                    .args(["west.cloud", "forecast2"])
                    .on_host("west.cloud"),
                NextWorker::new(WorkerName::DownloadResults).args([
                    "west.cloud",
                    "forecast2",
                    "--run-date",
                    "2018-01-20"
                ]),
            ]
        );
    }

    #[test]
    fn watch_nemo_without_optional_sections_skips_fvcom_and_waves() {
        let toml = CONFIG
            .replace("[vhfr_fvcom_runs]\nhost = \"west.cloud\"", "")
            .replace("[wave_forecasts]\nhost = \"west.cloud\"\nrun_when = \"after nowcast-green\"", "");
        let config = config_from(&toml);
        assert!(config.vhfr_fvcom_runs.is_none());
        assert!(config.wave_forecasts.is_none());

        let next = after_watch_nemo(&watch_nemo("nowcast"), &config, &Checklist::new()).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].worker, WorkerName::DownloadResults);

        let next = after_watch_nemo(&watch_nemo("nowcast-green"), &config, &Checklist::new()).unwrap();
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn hindcast_results_split_by_run_id_date() {
        let mut checklist = Checklist::new();
        checklist.update(NEMO_RUN, json!({"hindcast": {"run id": "11mar18hindcast"}}));

        let m = Message::new(WorkerName::DownloadResults, MsgType::success("hindcast"));
        assert_eq!(
            after_download_results(&m, &config(), &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::SplitResults).args(["hindcast", "2018-03-11"])]
        );
    }

    #[test]
    fn download_results_reads_run_date_from_checklist() {
        let mut checklist = Checklist::new();
        checklist.update(
            NEMO_RUN,
            json!({"forecast": {"host": "west.cloud", "run date": "2018-01-21"}}),
        );

        let m = Message::new(WorkerName::DownloadResults, MsgType::success("forecast"));
        assert_eq!(
            after_download_results(&m, &config(), &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::MakePlots).args([
                "nemo",
                "forecast",
                "publish",
                "--run-date",
                "2018-01-21"
            ])]
        );
    }

    #[test]
    fn download_results_without_run_entry_reports_missing_prerequisite() {
        let m = Message::new(WorkerName::DownloadResults, MsgType::success("nowcast"));
        let err = after_download_results(&m, &config(), &Checklist::new()).unwrap_err();
        assert!(matches!(err, DecisionError::MissingPrerequisite(ref e) if e.namespace == NEMO_RUN));
    }

    #[test]
    fn hindcast_segments_chain_on_hindcast_hosts_only() {
        let payload = json!({"hindcast": {"host": "cedar", "run id": "21dec17hindcast"}});
        let m = Message::new(WorkerName::WatchNemoHindcast, MsgType::Success(Default::default()))
            .with_payload(payload);
        assert_eq!(
            after_watch_nemo_hindcast(&m, &config(), &Checklist::new()).unwrap(),
            vec![
                NextWorker::new(WorkerName::DownloadResults).args([
                    "cedar",
                    "hindcast",
                    "--run-date",
                    "2017-12-21"
                ]),
                NextWorker::new(WorkerName::RunNemoHindcast).args(["cedar"]),
            ]
        );

        let m = Message::new(WorkerName::RunNemoHindcast, MsgType::Success(Default::default()))
            .with_payload(json!({"hindcast": {"host": "west.cloud"}}));
        assert!(after_run_nemo_hindcast(&m, &config(), &Checklist::new()).unwrap().is_empty());
    }
}
