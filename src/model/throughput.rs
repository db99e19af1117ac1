//! Throughput aggregation: bucket sizes and the peak interval.

use crate::error::{AnalyzeError, Result};
use crate::model::group::Bucket;
use crate::model::stats::Summary;
use serde::Serialize;

/// Number of operations that finished in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThroughputPoint {
    pub index: i64,
    pub count: usize,
}

/// One point per bucket, in bucket order.
pub fn throughput(buckets: &[Bucket<'_>]) -> Vec<ThroughputPoint> {
    buckets
        .iter()
        .map(|b| ThroughputPoint {
            index: b.index,
            count: b.records.len(),
        })
        .collect()
}

/// The point with the highest count; the earliest one wins a tie.
pub fn peak(points: &[ThroughputPoint]) -> Result<ThroughputPoint> {
    let (first, rest) = points.split_first().ok_or(AnalyzeError::EmptyTrajectory)?;
    Ok(rest
        .iter()
        .fold(*first, |best, p| if p.count > best.count { *p } else { best }))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThroughputStats {
    pub peak: ThroughputPoint,
    /// Over the per-bucket counts; `None` with fewer than two buckets.
    pub summary: Option<Summary>,
}

pub fn throughput_stats(points: &[ThroughputPoint]) -> Result<ThroughputStats> {
    let counts: Vec<f64> = points.iter().map(|p| p.count as f64).collect();
    Ok(ThroughputStats {
        peak: peak(points)?,
        summary: Summary::from_samples(&counts),
    })
}
