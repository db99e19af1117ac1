//! Record normalizer: raw text rows -> records with two instants and a latency.

use crate::error::{AnalyzeError, Result};
use crate::log::RawRecord;
use crate::model::interval::nanos;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use std::collections::BTreeMap;

pub const INITIAL_TIMESTAMP: &str = "initial_timestamp";
pub const FINAL_TIMESTAMP: &str = "final_timestamp";

/// A completed operation with parsed timestamps. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Source row number, kept for diagnostics.
    pub row: usize,
    pub initial_timestamp: DateTime<FixedOffset>,
    pub final_timestamp: DateTime<FixedOffset>,
    /// `final_timestamp - initial_timestamp`; negative when the source log is.
    pub latency: TimeDelta,
    /// Every other column of the row, untouched.
    pub fields: BTreeMap<String, String>,
}

impl NormalizedRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn latency_secs(&self) -> f64 {
        nanos(self.latency) as f64 / 1e9
    }
}

/// Normalize a whole batch. The first malformed record aborts the batch.
pub fn normalize(raw: Vec<RawRecord>) -> Result<Vec<NormalizedRecord>> {
    raw.into_iter().map(normalize_one).collect()
}

fn normalize_one(raw: RawRecord) -> Result<NormalizedRecord> {
    let RawRecord { row, mut fields } = raw;

    let initial_timestamp = take_timestamp(row, &mut fields, INITIAL_TIMESTAMP)?;
    let final_timestamp = take_timestamp(row, &mut fields, FINAL_TIMESTAMP)?;

    Ok(NormalizedRecord {
        row,
        initial_timestamp,
        final_timestamp,
        latency: final_timestamp - initial_timestamp,
        fields,
    })
}

fn take_timestamp(
    row: usize,
    fields: &mut BTreeMap<String, String>,
    field: &str,
) -> Result<DateTime<FixedOffset>> {
    let malformed = |reason: String| AnalyzeError::MalformedRecord {
        record: row,
        field: field.to_string(),
        reason,
    };

    let text = fields
        .remove(field)
        .ok_or_else(|| malformed("is missing".to_string()))?;
    parse_timestamp(&text).ok_or_else(|| malformed(format!("cannot parse {:?} as a date-time", text)))
}

/// Parse an ISO 8601 date-time. Text without an offset is read as UTC.
///
/// Accepted: extended (`2021-03-01T10:00:00`) and basic (`20210301T100000`)
/// forms, `T` or space separator, optional fraction with `.` or `,`, and an
/// offset written as `Z`, `+HH`, `+HHMM` or `+HH:MM`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    const WITH_OFFSET: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y%m%dT%H%M%S%.f%#z",
    ];
    const NAIVE: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y%m%dT%H%M%S%.f",
    ];

    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // A comma only ever appears as the decimal mark of the seconds.
    let text = text.replacen(',', ".", 1);
    let text = text.as_str();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }
    for fmt in WITH_OFFSET {
        if let Ok(ts) = DateTime::parse_from_str(text, fmt) {
            return Some(ts);
        }
    }
    for fmt in NAIVE {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    ["%Y-%m-%d", "%Y%m%d"]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}
