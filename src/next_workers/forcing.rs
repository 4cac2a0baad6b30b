// src/next_workers/forcing.rs

//! Forcing preparation: weather, sea surface height, rivers, Live Ocean
//! boundaries, turbidity, and getting all of it onto the run hosts.

use crate::checklist::Checklist;
use crate::config::Config;
use crate::message::Message;
use crate::next_workers::{Decision, sole_key, success_detail};
use crate::worker::{NextWorker, WorkerName};

/// For each enabled host, upload forcing files to hosts without shared
/// storage and link them directly on shared-storage hosts.
fn upload_or_link(config: &Config, upload_as: &str, link_as: &str) -> Vec<NextWorker> {
    let mut next = Vec::new();
    for (host, host_cfg) in config.run.enabled_hosts.iter() {
        if !host_cfg.shared_storage {
            next.push(NextWorker::new(WorkerName::UploadForcing).args([host.as_str(), upload_as]));
        } else if host_cfg.make_forcing_links {
            next.push(NextWorker::new(WorkerName::MakeForcingLinks).args([host.as_str(), link_as]));
        }
    }
    next
}

pub fn after_download_weather(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::DownloadWeather, msg, config)? else {
        return Ok(Vec::new());
    };

    let mut next = Vec::new();
    match detail.run_type.as_deref() {
        Some("06") => {
            next.push(NextWorker::new(WorkerName::MakeRunoffFile));
            for station in config.observations.ctd_data.stations.iter() {
                next.push(NextWorker::new(WorkerName::GetOncCtd).args([station]));
            }
            for ferry in config.observations.ferry_data.ferries.iter() {
                next.push(NextWorker::new(WorkerName::GetOncFerry).args([ferry]));
            }
            next.push(NextWorker::new(WorkerName::GetNeahBaySsh).args(["forecast2"]));
            next.push(NextWorker::new(WorkerName::GribToNetcdf).args(["forecast2"]));
        }
        Some("12") => {
            next.push(NextWorker::new(WorkerName::GetNeahBaySsh).args(["nowcast"]));
            next.push(NextWorker::new(WorkerName::GribToNetcdf).args(["nowcast+"]));
            next.push(NextWorker::new(WorkerName::DownloadLiveOcean));
        }
        _ => {}
    }
    Ok(next)
}

/// Only the forecast sea surface height goes out on its own; nowcast and
/// forecast2 ssh files travel with the weather forcing.
pub fn after_get_neah_bay_ssh(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::GetNeahBaySsh, msg, config)? else {
        return Ok(Vec::new());
    };

    match detail.run_type.as_deref() {
        Some("forecast") => Ok(upload_or_link(config, "ssh", "ssh")),
        _ => Ok(Vec::new()),
    }
}

pub fn after_grib_to_netcdf(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::GribToNetcdf, msg, config)? else {
        return Ok(Vec::new());
    };
    let Some(run_type) = detail.run_type.as_deref() else {
        return Ok(Vec::new());
    };

    let mut next = vec![NextWorker::new(WorkerName::PingErddap).args(["weather"])];
    next.extend(upload_or_link(config, run_type, run_type));
    Ok(next)
}

pub fn after_make_runoff_file(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::MakeRunoffFile, msg, config)?;
    Ok(Vec::new())
}

/// The payload is keyed by the date of the downloaded products.
pub fn after_download_live_ocean(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    if success_detail(WorkerName::DownloadLiveOcean, msg, config)?.is_none() {
        return Ok(Vec::new());
    }
    let Some(run_date) = sole_key(&msg.payload) else {
        return Ok(Vec::new());
    };
    Ok(vec![
        NextWorker::new(WorkerName::MakeLiveOceanFiles).args(["--run-date", run_date]),
    ])
}

pub fn after_make_live_ocean_files(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    success_detail(WorkerName::MakeLiveOceanFiles, msg, config)?;
    Ok(Vec::new())
}

/// Turbidity forcing is for nowcast-green, so shared-storage hosts link it
/// under that run type.
pub fn after_make_turbidity_file(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    if success_detail(WorkerName::MakeTurbidityFile, msg, config)?.is_none() {
        return Ok(Vec::new());
    }
    Ok(upload_or_link(config, "turbidity", "nowcast-green"))
}

/// The payload is keyed by the host the files went to. A payload without a
/// host means the worker died mid-report; nothing follows.
pub fn after_upload_forcing(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let detail = success_detail(WorkerName::UploadForcing, msg, config)?;
    let Some(host) = sole_key(&msg.payload) else {
        return Ok(Vec::new());
    };
    let Some(detail) = detail else {
        return Ok(Vec::new());
    };

    let link_as = match detail.run_type.as_deref() {
        Some("turbidity") => "nowcast-green",
        Some(run_type) => run_type,
        None => return Ok(Vec::new()),
    };
    match config.run.enabled_hosts.get(host) {
        Some(host_cfg) if host_cfg.make_forcing_links => Ok(vec![
            NextWorker::new(WorkerName::MakeForcingLinks).args([host, link_as]),
        ]),
        _ => Ok(Vec::new()),
    }
}

/// Run types a completed set of forcing links unlocks.
fn linked_run_types(links: &str) -> &'static [&'static str] {
    match links {
        "nowcast+" => &["nowcast", "nowcast-dev"],
        "ssh" => &["forecast"],
        "forecast2" => &["forecast2"],
        "nowcast-green" => &["nowcast-green"],
        _ => &[],
    }
}

pub fn after_make_forcing_links(msg: &Message, config: &Config, _checklist: &Checklist) -> Decision {
    let Some(detail) = success_detail(WorkerName::MakeForcingLinks, msg, config)? else {
        return Ok(Vec::new());
    };
    let Some(host) = sole_key(&msg.payload) else {
        return Ok(Vec::new());
    };
    let links = detail.run_type.as_deref().unwrap_or_default();

    Ok(linked_run_types(links)
        .iter()
        .filter(|run_type| config.host_runs(host, run_type))
        .map(|run_type| {
            NextWorker::new(WorkerName::RunNemo)
                .args([host, *run_type])
                .on_host(host)
        })
        .collect())
}
