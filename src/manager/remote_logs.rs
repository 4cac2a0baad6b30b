// src/manager/remote_logs.rs

//! Log relay for workers that run on the cloud host.
//!
//! Once forcing links are in place on the cloud host, the NEMO run and watch
//! workers that follow send their log lines back through the manager. Each
//! gets a span carrying its name and host; the span lives until that
//! worker's next completion message.

use std::collections::HashMap;
use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::{Span, debug, error, info, info_span, warn};

use crate::config::Config;
use crate::message::Message;
use crate::next_workers::sole_key;
use crate::worker::WorkerName;

/// Workers whose logs are relayed while they run on the cloud host.
const RELAYED: [WorkerName; 2] = [WorkerName::RunNemo, WorkerName::WatchNemo];

/// Level of a relayed log line, as written by the remote worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RemoteLogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl RemoteLogLevel {
    /// Split a `LEVEL text` line; lines without a level prefix are info.
    pub fn split_line(line: &str) -> (Self, &str) {
        if let Some((head, rest)) = line.split_once(char::is_whitespace) {
            let head = head.trim_end_matches(':');
            if let Ok(level) = RemoteLogLevel::from_str(head) {
                return (level, rest.trim_start());
            }
        }
        (RemoteLogLevel::Info, line)
    }
}

#[derive(Debug, Default)]
pub struct RemoteLogRegistry {
    spans: HashMap<WorkerName, Span>,
}

impl RemoteLogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or detach spans according to a completion message.
    pub fn observe(&mut self, msg: &Message, config: &Config) {
        match msg.source {
            WorkerName::MakeForcingLinks if msg.msg_type.is_success() => {
                if let Some(host) = sole_key(&msg.payload).filter(|h| config.is_cloud_host(h)) {
                    for worker in RELAYED {
                        self.attach(worker, host);
                    }
                }
            }
            WorkerName::RunNemo | WorkerName::WatchNemo => self.detach(msg.source),
            _ => {}
        }
    }

    pub fn is_attached(&self, worker: WorkerName) -> bool {
        self.spans.contains_key(&worker)
    }

    /// Emit a relayed line inside the worker's span.
    ///
    /// Output from workers without a remote logger is only kept at debug.
    pub fn relay(&self, worker: WorkerName, level: RemoteLogLevel, text: &str) {
        let Some(span) = self.spans.get(&worker) else {
            debug!(%worker, "output: {}", text);
            return;
        };
        let _entered = span.enter();
        match level {
            RemoteLogLevel::Debug => debug!("{text}"),
            RemoteLogLevel::Info => info!("{text}"),
            RemoteLogLevel::Warning => warn!("{text}"),
            RemoteLogLevel::Error | RemoteLogLevel::Critical => error!("{text}"),
        }
    }

    fn attach(&mut self, worker: WorkerName, host: &str) {
        let span = info_span!("remote", %worker, host);
        self.spans.insert(worker, span);
        debug!(%worker, host, "attached remote logger");
    }

    fn detach(&mut self, worker: WorkerName) {
        if self.spans.remove(&worker).is_some() {
            debug!(%worker, "detached remote logger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgType;
    use crate::next_workers::test_support::config;
    use serde_json::json;

    fn links_on(host: &str) -> Message {
        Message::new(WorkerName::MakeForcingLinks, MsgType::success("nowcast+"))
            .with_payload(json!({ host: {"links": "..."} }))
    }

    #[test]
    fn cloud_links_attach_run_and_watch_loggers() {
        let mut logs = RemoteLogRegistry::new();
        logs.observe(&links_on("west.cloud"), &config());
        assert!(logs.is_attached(WorkerName::RunNemo));
        assert!(logs.is_attached(WorkerName::WatchNemo));
    }

    #[test]
    fn other_hosts_do_not_attach() {
        let mut logs = RemoteLogRegistry::new();
        logs.observe(&links_on("salish"), &config());
        assert!(!logs.is_attached(WorkerName::RunNemo));
    }

    #[test]
    fn completion_detaches_only_that_worker() {
        let config = config();
        let mut logs = RemoteLogRegistry::new();
        logs.observe(&links_on("west.cloud"), &config);

        logs.observe(&Message::new(WorkerName::RunNemo, MsgType::failure("nowcast")), &config);
        assert!(!logs.is_attached(WorkerName::RunNemo));
        assert!(logs.is_attached(WorkerName::WatchNemo));

        logs.observe(&Message::new(WorkerName::WatchNemo, MsgType::Crash), &config);
        assert!(!logs.is_attached(WorkerName::WatchNemo));
    }

    #[test]
    fn level_prefix_is_split_off() {
        assert_eq!(
            RemoteLogLevel::split_line("WARNING: disk nearly full"),
            (RemoteLogLevel::Warning, "disk nearly full")
        );
        assert_eq!(
            RemoteLogLevel::split_line("DEBUG step 12"),
            (RemoteLogLevel::Debug, "step 12")
        );
        assert_eq!(
            RemoteLogLevel::split_line("timestep 5 done"),
            (RemoteLogLevel::Info, "timestep 5 done")
        );
    }
}
