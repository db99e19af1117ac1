//! Aggregation model: normalized records -> buckets -> throughput, plus the
//! latency and success statistics shown next to it in a report, and the
//! per-run points of a multi-run scalability table.

pub mod filter;
pub mod group;
pub mod interval;
pub mod record;
pub mod runs;
pub mod stats;
pub mod throughput;

pub use filter::RecordFilter;
pub use group::{Predicate, group};
pub use interval::IntervalWidth;
pub use record::{NormalizedRecord, normalize};
pub use runs::{Run, ScalabilityData, build_scalability};
pub use stats::Summary;
pub use throughput::{ThroughputPoint, ThroughputStats, throughput, throughput_stats};

use crate::error::{AnalyzeError, Result};
use filter::{CLIENT_ADDR, REQUEST_TYPE, RESULT_ERR, RESULT_OK};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Label used for "no restriction" in per-type tables.
pub const ALL: &str = "All";

#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub row: usize,
    pub initial_timestamp: String,
    pub final_timestamp: String,
    pub latency_secs: f64,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketView {
    pub index: i64,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRowView {
    pub request_type: String,
    pub request_result: String,
    pub samples: usize,
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultRowView {
    pub request_type: String,
    pub ok: usize,
    pub err: usize,
    /// 100 when there were no requests of this type.
    pub ok_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    /// Rows in the log.
    pub records: usize,
    /// Rows that passed the filter.
    pub included: usize,
    /// Distinct client addresses among included rows.
    pub clients: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub interval: String,
    pub filter: RecordFilter,
    pub totals: TotalsView,
    pub anchor: Option<String>,
    pub trajectory: Vec<ThroughputPoint>,
    /// `None` when nothing passed the filter.
    pub throughput: Option<ThroughputStats>,
    pub latency: Option<Summary>,
    pub latency_by_type: Vec<LatencyRowView>,
    pub results_by_type: Vec<ResultRowView>,

    /// Per-bucket records, only filled for detailed reports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<BucketView>,

    /// Rows of the optional proxy stats table, attached by the caller.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxy_stats: Vec<BTreeMap<String, String>>,
}

/// Build report data:
/// - group the records that pass `filter` into `width` buckets
/// - throughput trajectory, peak and summary over those buckets
/// - latency summary over the same records
/// - per request type latency and Ok/Err tables over all records
pub fn build_report_data(
    records: &[NormalizedRecord],
    filter: &RecordFilter,
    width: IntervalWidth,
    detailed: bool,
) -> Result<ReportData> {
    let keep = |r: &NormalizedRecord| filter.matches(r);
    let predicate: Option<Predicate<'_>> = if filter.is_empty() {
        None
    } else {
        Some(&keep)
    };
    let grouping = group(records, predicate, width);

    let trajectory = throughput(&grouping.buckets);
    let throughput = match throughput_stats(&trajectory) {
        Ok(stats) => Some(stats),
        Err(AnalyzeError::EmptyTrajectory) => None,
        Err(e) => return Err(e),
    };

    let included = filter.apply(records);
    let clients: BTreeSet<&str> = included.iter().filter_map(|r| r.field(CLIENT_ADDR)).collect();

    let buckets = if detailed {
        grouping
            .buckets
            .iter()
            .map(|b| BucketView {
                index: b.index,
                records: b.records.iter().map(|r| record_view(r)).collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ReportData {
        interval: width.to_string(),
        filter: filter.clone(),
        totals: TotalsView {
            records: records.len(),
            included: included.len(),
            clients: clients.len(),
        },
        anchor: grouping.anchor.map(|a| a.to_rfc3339()),
        trajectory,
        throughput,
        latency: latency_summary(&included),
        latency_by_type: latency_by_type(records),
        results_by_type: results_by_type(records),
        buckets,
        proxy_stats: Vec::new(),
    })
}

fn latency_summary(records: &[&NormalizedRecord]) -> Option<Summary> {
    let secs: Vec<f64> = records.iter().map(|r| r.latency_secs()).collect();
    Summary::from_samples(&secs)
}

/// Request types seen in the log (sorted), followed by `None` for "all".
fn request_types(records: &[NormalizedRecord]) -> Vec<Option<&str>> {
    let seen: BTreeSet<&str> = records.iter().filter_map(|r| r.field(REQUEST_TYPE)).collect();
    seen.into_iter().map(Some).chain([None]).collect()
}

fn latency_by_type(records: &[NormalizedRecord]) -> Vec<LatencyRowView> {
    let mut rows = Vec::new();
    for request_type in request_types(records) {
        for request_result in [Some(RESULT_OK), Some(RESULT_ERR), None] {
            let matching = RecordFilter::new(request_type, request_result).apply(records);
            if let Some(summary) = latency_summary(&matching) {
                rows.push(LatencyRowView {
                    request_type: request_type.unwrap_or(ALL).to_string(),
                    request_result: request_result.unwrap_or(ALL).to_string(),
                    samples: matching.len(),
                    summary,
                });
            }
        }
    }
    rows
}

fn results_by_type(records: &[NormalizedRecord]) -> Vec<ResultRowView> {
    request_types(records)
        .into_iter()
        .map(|request_type| {
            let ok = RecordFilter::new(request_type, Some(RESULT_OK)).apply(records).len();
            let err = RecordFilter::new(request_type, Some(RESULT_ERR)).apply(records).len();
            let ok_percent = if ok + err > 0 {
                ok as f64 / (ok + err) as f64 * 100.0
            } else {
                100.0
            };
            ResultRowView {
                request_type: request_type.unwrap_or(ALL).to_string(),
                ok,
                err,
                ok_percent,
            }
        })
        .collect()
}

fn record_view(r: &NormalizedRecord) -> RecordView {
    RecordView {
        row: r.row,
        initial_timestamp: r.initial_timestamp.to_rfc3339(),
        final_timestamp: r.final_timestamp.to_rfc3339(),
        latency_secs: r.latency_secs(),
        fields: r.fields.clone(),
    }
}
