// src/manager/dispatch.rs

//! Action tables for the in-process manager.
//!
//! Launch decisions are shared with [`crate::next_workers`] except for the
//! web-publishing tail: here plots become site pages, pages are pushed to
//! the web, and the push after the day's final page finishes the day.

use serde_json::json;

use crate::checklist::Checklist;
use crate::config::Config;
use crate::manager::ManagerAction;
use crate::message::{Message, MsgDetail};
use crate::next_workers::nemo::NEMO_RUN;
use crate::next_workers::{self, DecisionError, registry};
use crate::worker::{NextWorker, WorkerName};

/// Checklist namespace for site pages.
pub const SITE_PAGES: &str = "salishsea site pages";

/// Key in [`SITE_PAGES`] set once the day's last page is made.
pub const FINISH_THE_DAY: &str = "finish the day";

/// Actions for `msg`, in the order they must be carried out.
///
/// `Ok(None)` for crash and failure messages. Successful messages always
/// start with an [`ManagerAction::UpdateChecklist`], so launches can rely on
/// the payload already being recorded.
pub fn actions_for(
    msg: &Message,
    config: &Config,
    checklist: &Checklist,
) -> Result<Option<Vec<ManagerAction>>, DecisionError> {
    registry::check(msg.source, &msg.msg_type, config)?;
    let Some(detail) = msg.msg_type.detail().filter(|_| msg.msg_type.is_success()) else {
        return Ok(None);
    };

    let mut actions = vec![ManagerAction::UpdateChecklist {
        worker: msg.source,
        namespace: msg.source.checklist_namespace().to_string(),
        payload: msg.payload.clone(),
    }];

    let launches = match msg.source {
        WorkerName::MakePlots => site_pages_for_plots(detail, checklist)?,
        WorkerName::MakeSitePage => {
            if is_final_page(detail, config) {
                actions.push(ManagerAction::UpdateChecklist {
                    worker: msg.source,
                    namespace: SITE_PAGES.to_string(),
                    payload: json!({ FINISH_THE_DAY: true }),
                });
            }
            vec![NextWorker::new(WorkerName::PushToWeb)]
        }
        // The day ends through the site push, not the feeds.
        WorkerName::MakeFeeds => Vec::new(),
        _ => next_workers::after(msg, config, checklist)?,
    };
    actions.extend(launches.into_iter().map(ManagerAction::LaunchWorker));

    if msg.source == WorkerName::PushToWeb && day_is_finished(checklist) {
        actions.push(ManagerAction::FinishTheDay);
    }

    Ok(Some(actions))
}

/// NEMO plots each get a site page of the same type.
fn site_pages_for_plots(
    detail: &MsgDetail,
    checklist: &Checklist,
) -> Result<Vec<NextWorker>, DecisionError> {
    let (Some("nemo"), Some(run_type), Some(page_type)) = (
        detail.model.as_deref(),
        detail.run_type.as_deref(),
        detail.stage.as_deref(),
    ) else {
        return Ok(Vec::new());
    };

    let run_date = checklist.try_get_str(NEMO_RUN, &[run_type, "run date"])?;
    Ok(vec![NextWorker::new(WorkerName::MakeSitePage).args([
        run_type,
        page_type,
        "--run-date",
        run_date,
    ])])
}

/// The last run of the day is nowcast-green where any host runs it.
fn last_daily_run_type(config: &Config) -> &'static str {
    let runs_green = config
        .run
        .enabled_hosts
        .keys()
        .any(|host| config.host_runs(host, "nowcast-green"));
    if runs_green { "nowcast-green" } else { "nowcast" }
}

fn is_final_page(detail: &MsgDetail, config: &Config) -> bool {
    detail.run_type.as_deref() == Some(last_daily_run_type(config))
        && detail.stage.as_deref() == Some("research")
}

fn day_is_finished(checklist: &Checklist) -> bool {
    checklist
        .get(SITE_PAGES)
        .and_then(|pages| pages.get(FINISH_THE_DAY))
        .is_some()
}
