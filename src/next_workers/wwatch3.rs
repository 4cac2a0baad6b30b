// src/next_workers/wwatch3.rs

//! WaveWatch3 forecasts on the wave host.

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::{Decision, DecisionError, payload_str, success_detail};
use crate::worker::{NextWorker, WorkerName};

/// Checklist namespace written by `run_ww3` / `watch_ww3`.
pub const WWATCH3_RUN: &str = "WWATCH3 run";

fn wave_success<'m>(
    worker: WorkerName,
    msg: &'m Message,
    config: &'m Config,
) -> Result<Option<(&'m str, &'m str)>, DecisionError> {
    let detail = success_detail(worker, msg, config)?;
    let run_type = detail.and_then(|d| d.run_type.as_deref());
    Ok(run_type.zip(config.wave_forecasts.as_ref().map(|w| w.host.as_str())))
}

/// Wind and current files are made in parallel; the current file takes
/// longer so the run starts from its completion.
pub fn after_make_ww3_wind_file(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::MakeWw3WindFile, msg, config)?;
    Ok(Vec::new())
}

pub fn after_make_ww3_current_file(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = wave_success(WorkerName::MakeWw3CurrentFile, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(vec![NextWorker::new(WorkerName::RunWw3).args([host, run_type]).on_host(host)])
}

pub fn after_run_ww3(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = wave_success(WorkerName::RunWw3, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(vec![NextWorker::new(WorkerName::WatchWw3).args([host, run_type]).on_host(host)])
}

pub fn after_watch_ww3(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some((run_type, host)) = wave_success(WorkerName::WatchWw3, msg, config)? else {
        return Ok(Vec::new());
    };
    let run_date = payload_str(WorkerName::WatchWw3, msg, &[run_type, "run date"])?;
    Ok(vec![
        NextWorker::new(WorkerName::DownloadWwatch3Results).args([host, run_type, "--run-date", run_date]),
    ])
}

pub fn after_download_wwatch3_results(msg: &Message, config: &Config, checklist: &Checklist) -> Decision {
    let Some((run_type, _host)) = wave_success(WorkerName::DownloadWwatch3Results, msg, config)? else {
        return Ok(Vec::new());
    };
    let run_date = checklist.try_get_str(WWATCH3_RUN, &[run_type, "run date"])?;
    Ok(vec![
        NextWorker::new(WorkerName::MakePlots).args(["wwatch3", run_type, "publish", "--run-date", run_date]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgType;
    use crate::next_workers::test_support::config;
    use serde_json::json;

    #[test]
    fn current_file_starts_the_wave_run() {
        let config = config();
        let checklist = Checklist::new();

        let m = Message::new(WorkerName::MakeWw3WindFile, MsgType::success("forecast"));
        assert!(after_make_ww3_wind_file(&m, &config, &checklist).unwrap().is_empty());

        let m = Message::new(WorkerName::MakeWw3CurrentFile, MsgType::success("forecast"));
        assert_eq!(
            after_make_ww3_current_file(&m, &config, &checklist).unwrap(),
            vec![NextWorker::new(WorkerName::RunWw3)
                .args(["west.cloud", "forecast"])
                .on_host("west.cloud")]
        );
    }

    #[test]
    fn wave_results_are_downloaded_then_plotted() {
        let config = config();
        let m = Message::new(WorkerName::WatchWw3, MsgType::success("forecast2"))
            .with_payload(json!({"forecast2": {"host": "west.cloud", "run date": "2018-01-20"}}));
        assert_eq!(
            after_watch_ww3(&m, &config, &Checklist::new()).unwrap(),
            vec![NextWorker::new(WorkerName::DownloadWwatch3Results).args([
                "west.cloud",
                "forecast2",
                "--run-date",
                "2018-01-20"
            ])]
        );

        let mut checklist = Checklist::new();
        checklist.update(WWATCH3_RUN, json!({"forecast2": {"run date": "2018-01-20"}}));
        let m = Message::new(WorkerName::DownloadWwatch3Results, MsgType::success("forecast2"));
        assert_eq!(
            after_download_wwatch3_results(&m, &config, &checklist).unwrap()[0].args,
            vec!["wwatch3", "forecast2", "publish", "--run-date", "2018-01-20"]
        );
    }

    #[test]
    fn wave_failures_schedule_nothing() {
        let m = Message::new(WorkerName::RunWw3, MsgType::failure("forecast"));
        assert!(after_run_ww3(&m, &config(), &Checklist::new()).unwrap().is_empty());
    }
}
