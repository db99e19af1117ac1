//! Multi-run scalability: one point per benchmark run, grouped into series by
//! the number of dbproxies and ordered by the number of clients.

use crate::error::{AnalyzeError, Result};
use crate::log::RawRun;
use crate::model::filter::{CLIENT_ADDR, RecordFilter};
use crate::model::group::{Predicate, group};
use crate::model::interval::IntervalWidth;
use crate::model::record::{NormalizedRecord, normalize};
use crate::model::stats::Summary;
use crate::model::throughput::{throughput, throughput_stats};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Runs with fewer datapoints are dropped from the analysis.
pub const MIN_DATAPOINTS: usize = 500;
/// Runs with fewer datapoints are kept, with a warning.
pub const LOW_DATAPOINTS: usize = 2500;

/// A parsed run: its normalized perf log and its dbproxy count.
#[derive(Debug, Clone)]
pub struct Run {
    pub name: String,
    pub records: Vec<NormalizedRecord>,
    pub proxies: usize,
}

impl Run {
    pub fn from_raw(raw: RawRun) -> Result<Self> {
        Ok(Self {
            name: raw.name,
            records: normalize(raw.perf)?,
            proxies: raw.proxies.len(),
        })
    }

    /// Distinct client addresses over the whole log.
    pub fn clients(&self) -> usize {
        let clients: BTreeSet<&str> =
            self.records.iter().filter_map(|r| r.field(CLIENT_ADDR)).collect();
        clients.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPoint {
    pub name: String,
    pub clients: usize,
    /// Rows in the perf log, all results.
    pub datapoints: usize,
    /// Rows with request_result == Ok.
    pub successful: usize,
    /// Mean successful requests per interval.
    pub mean_throughput: Option<f64>,
    /// Mean latency of successful requests, in seconds.
    pub mean_latency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxySeries {
    pub proxies: usize,
    /// Ascending by client count.
    pub runs: Vec<RunPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalabilityData {
    pub interval: String,
    /// Runs found, before the datapoint check.
    pub total_runs: usize,
    pub excluded: Vec<String>,
    /// Ascending by dbproxy count.
    pub series: Vec<ProxySeries>,
}

/// Drop runs that are too small to analyze and warn about thin ones.
pub fn check_data_validity(runs: Vec<Run>) -> (Vec<Run>, Vec<String>) {
    let total = runs.len();
    let mut kept = Vec::with_capacity(total);
    let mut excluded = Vec::new();

    for run in runs {
        let datapoints = run.records.len();
        if datapoints < MIN_DATAPOINTS {
            tracing::warn!(
                run = %run.name,
                clients = run.clients(),
                proxies = run.proxies,
                datapoints,
                "run has too few datapoints, excluded from analysis"
            );
            excluded.push(run.name);
            continue;
        }
        if datapoints < LOW_DATAPOINTS {
            tracing::warn!(
                run = %run.name,
                clients = run.clients(),
                proxies = run.proxies,
                datapoints,
                "run has few datapoints"
            );
        }
        kept.push(run);
    }

    if !excluded.is_empty() {
        tracing::warn!(
            excluded = excluded.len(),
            total,
            "runs excluded for lack of data"
        );
    }
    (kept, excluded)
}

/// Throughput and latency of the successful requests of one run.
pub fn model_run(run: &Run, width: IntervalWidth) -> Result<RunPoint> {
    let successful = RecordFilter::successful();
    let keep = |r: &NormalizedRecord| successful.matches(r);
    let predicate: Predicate<'_> = &keep;
    let grouping = group(&run.records, Some(predicate), width);

    let mean_throughput = match throughput_stats(&throughput(&grouping.buckets)) {
        Ok(stats) => stats.summary.map(|s| s.mean),
        Err(AnalyzeError::EmptyTrajectory) => None,
        Err(e) => return Err(e),
    };

    let latencies: Vec<f64> = successful
        .apply(&run.records)
        .iter()
        .map(|r| r.latency_secs())
        .collect();

    Ok(RunPoint {
        name: run.name.clone(),
        clients: run.clients(),
        datapoints: run.records.len(),
        successful: grouping.record_count(),
        mean_throughput,
        mean_latency: Summary::from_samples(&latencies).map(|s| s.mean),
    })
}

/// Validate, model and arrange runs for the scalability table.
pub fn build_scalability(runs: Vec<Run>, width: IntervalWidth) -> Result<ScalabilityData> {
    let total_runs = runs.len();
    let (runs, excluded) = check_data_validity(runs);

    let mut by_proxies: BTreeMap<usize, Vec<RunPoint>> = BTreeMap::new();
    for run in &runs {
        by_proxies
            .entry(run.proxies)
            .or_default()
            .push(model_run(run, width)?);
    }

    let series = by_proxies
        .into_iter()
        .map(|(proxies, mut points)| {
            // Stable: equal client counts keep run order.
            points.sort_by_key(|p| p.clients);
            ProxySeries {
                proxies,
                runs: points,
            }
        })
        .collect();

    Ok(ScalabilityData {
        interval: width.to_string(),
        total_runs,
        excluded,
        series,
    })
}
