//! Interval width: the fixed bucket granularity, and the bucket index math.

use crate::error::{AnalyzeError, Result};
use chrono::TimeDelta;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Exact signed nanoseconds of a delta.
pub fn nanos(delta: TimeDelta) -> i128 {
    delta.num_seconds() as i128 * NANOS_PER_SEC + delta.subsec_nanos() as i128
}

/// A strictly positive duration. Defaults to one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalWidth(TimeDelta);

impl IntervalWidth {
    pub fn new(width: TimeDelta) -> Result<Self> {
        if nanos(width) <= 0 {
            return Err(AnalyzeError::InvalidInterval(format!(
                "width must be positive, got {}",
                width
            )));
        }
        Ok(Self(width))
    }

    /// Number of whole widths in `delta`, rounded toward negative infinity.
    pub fn index_of(&self, delta: TimeDelta) -> i64 {
        let q = nanos(delta).div_euclid(nanos(self.0));
        i64::try_from(q).unwrap_or(if q < 0 { i64::MIN } else { i64::MAX })
    }
}

impl Default for IntervalWidth {
    fn default() -> Self {
        Self(TimeDelta::seconds(1))
    }
}

impl fmt::Display for IntervalWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = nanos(self.0);
        let (value, unit) = [
            (3_600 * NANOS_PER_SEC, "h"),
            (60 * NANOS_PER_SEC, "m"),
            (NANOS_PER_SEC, "s"),
            (1_000_000, "ms"),
            (1_000, "us"),
        ]
        .into_iter()
        .find(|(scale, _)| n % scale == 0)
        .map(|(scale, unit)| (n / scale, unit))
        .unwrap_or((n, "ns"));
        write!(f, "{}{}", value, unit)
    }
}

/// Parse "<number><unit>", e.g. "1s", "500ms", "0.25s", "2m". A bare number is seconds.
impl FromStr for IntervalWidth {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*(ns|us|µs|ms|s|m|h)?\s*$")
            .map_err(|e| AnalyzeError::InvalidInterval(e.to_string()))?;

        let caps = re
            .captures(s)
            .ok_or_else(|| AnalyzeError::InvalidInterval(format!("cannot parse {:?}", s)))?;

        let value: f64 = caps[1]
            .parse()
            .map_err(|_| AnalyzeError::InvalidInterval(format!("bad number in {:?}", s)))?;
        let scale: f64 = match caps.get(2).map(|m| m.as_str()).unwrap_or("s") {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            _ => 3_600e9,
        };

        let total = (value * scale).round();
        if !(total >= 1.0 && total <= i64::MAX as f64) {
            return Err(AnalyzeError::InvalidInterval(format!(
                "{:?} is out of range",
                s
            )));
        }
        Self::new(TimeDelta::nanoseconds(total as i64))
    }
}
