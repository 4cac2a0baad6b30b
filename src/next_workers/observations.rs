// src/next_workers/observations.rs

//! Ocean Networks Canada observations and the ERDDAP datasets built on them.

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::{Decision, success_detail};
use crate::worker::{NextWorker, WorkerName};

fn ping(dataset: String) -> Vec<NextWorker> {
    vec![NextWorker::new(WorkerName::PingErddap).args([dataset])]
}

pub fn after_get_onc_ctd(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::GetOncCtd, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(detail
        .run_type
        .as_deref()
        .map(|station| ping(format!("{station}-CTD")))
        .unwrap_or_default())
}

pub fn after_get_onc_ferry(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::GetOncFerry, msg, config)? else {
        return Ok(Vec::new());
    };
    Ok(detail
        .run_type
        .as_deref()
        .map(|ferry| ping(format!("{ferry}-ferry")))
        .unwrap_or_default())
}

pub fn after_ping_erddap(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::PingErddap, msg, config)?;
    Ok(Vec::new())
}
