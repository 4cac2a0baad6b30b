// src/next_workers/publish.rs

//! Publishing and the end of the day.

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::nemo::NEMO_RUN;
use crate::next_workers::registry::FORECAST_RUN_TYPES;
use crate::next_workers::{Decision, success_detail};
use crate::worker::{NextWorker, WorkerName};

/// Published NEMO forecast plots get Atom feeds; everything else is terminal.
pub fn after_make_plots(msg: &Message, config: &Config, checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::MakePlots, msg, config)? else {
        return Ok(Vec::new());
    };

    match (
        detail.model.as_deref(),
        detail.run_type.as_deref(),
        detail.stage.as_deref(),
    ) {
        (Some("nemo"), Some(run_type), Some("publish")) if FORECAST_RUN_TYPES.contains(&run_type) => {
            let run_date = checklist.try_get_str(NEMO_RUN, &[run_type, "run date"])?;
            Ok(vec![
                NextWorker::new(WorkerName::MakeFeeds).args([run_type, "--run-date", run_date]),
            ])
        }
        _ => Ok(Vec::new()),
    }
}

/// The forecast's feeds are the last product of the day.
pub fn after_make_feeds(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::MakeFeeds, msg, config)? else {
        return Ok(Vec::new());
    };
    match detail.run_type.as_deref() {
        Some("forecast") => Ok(vec![NextWorker::new(WorkerName::ClearChecklist)]),
        _ => Ok(Vec::new()),
    }
}

/// Site pages are driven by the manager's action table; see
/// `manager::dispatch`.
pub fn after_make_site_page(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::MakeSitePage, msg, config)?;
    Ok(Vec::new())
}

pub fn after_push_to_web(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::PushToWeb, msg, config)?;
    Ok(Vec::new())
}

pub fn after_clear_checklist(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    if success_detail(WorkerName::ClearChecklist, msg, config)?.is_none() {
        return Ok(Vec::new());
    }
    Ok(vec![NextWorker::new(WorkerName::RotateLogs)])
}

pub fn after_rotate_logs(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::RotateLogs, msg, config)?;
    Ok(Vec::new())
}
