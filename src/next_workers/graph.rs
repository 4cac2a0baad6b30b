// src/next_workers/graph.rs

//! Static view of the workflow: which workers can follow which.
//!
//! The decision functions are the source of truth for *when* an edge is
//! taken; this table declares every edge they may take, so the graph can be
//! printed and checked without running anything. The continuous hindcast
//! loops back on itself, so the graph is not acyclic.

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;
use strum::IntoEnumIterator;

use crate::worker::WorkerName;

/// Workers that may be launched after `worker` reports.
pub fn successors(worker: WorkerName) -> &'static [WorkerName] {
    use WorkerName::*;
    match worker {
        DownloadWeather => &[
            MakeRunoffFile,
            GetOncCtd,
            GetOncFerry,
            GetNeahBaySsh,
            GribToNetcdf,
            DownloadLiveOcean,
        ],
        GetNeahBaySsh | MakeTurbidityFile => &[UploadForcing, MakeForcingLinks],
        GribToNetcdf => &[PingErddap, UploadForcing, MakeForcingLinks],
        UploadForcing => &[MakeForcingLinks],
        MakeForcingLinks => &[RunNemo],
        RunNemo => &[WatchNemo],
        WatchNemo => &[
            GetNeahBaySsh,
            MakeFvcomBoundary,
            MakeWw3WindFile,
            MakeWw3CurrentFile,
            MakeTurbidityFile,
            DownloadResults,
        ],
        RunNemoHindcast => &[WatchNemoHindcast],
        WatchNemoHindcast => &[DownloadResults, RunNemoHindcast],
        DownloadResults => &[SplitResults, MakePlots, PingErddap],
        GetOncCtd | GetOncFerry => &[PingErddap],
        DownloadLiveOcean => &[MakeLiveOceanFiles],
        MakeFvcomBoundary => &[RunFvcom],
        RunFvcom => &[WatchFvcom],
        WatchFvcom => &[DownloadFvcomResults],
        DownloadFvcomResults => &[MakePlots],
        MakeWw3CurrentFile => &[RunWw3],
        RunWw3 => &[WatchWw3],
        WatchWw3 => &[DownloadWwatch3Results],
        DownloadWwatch3Results => &[MakePlots],
        MakePlots => &[MakeFeeds, MakeSitePage],
        MakeSitePage => &[PushToWeb],
        PushToWeb => &[RotateLogs],
        MakeFeeds => &[ClearChecklist],
        ClearChecklist => &[RotateLogs],
        MakeRunoffFile | MakeLiveOceanFiles | MakeWw3WindFile | SplitResults | PingErddap
        | RotateLogs => &[],
    }
}

/// Directed graph with an edge `a -> b` for every declared successor.
pub fn workflow_graph() -> DiGraphMap<WorkerName, ()> {
    let mut graph = DiGraphMap::new();
    for worker in WorkerName::iter() {
        graph.add_node(worker);
        for next in successors(worker) {
            graph.add_edge(worker, *next, ());
        }
    }
    graph
}

/// Workers reachable from `starts`, in breadth-first order.
pub fn reachable_from(starts: &[WorkerName]) -> Vec<WorkerName> {
    let graph = workflow_graph();
    let mut seen = Vec::new();
    for start in starts {
        let mut bfs = Bfs::new(&graph, *start);
        while let Some(worker) = bfs.next(&graph) {
            if !seen.contains(&worker) {
                seen.push(worker);
            }
        }
    }
    seen
}
