//! Interval grouping engine.
//!
//! Records are assigned to fixed-width buckets by their `final_timestamp`,
//! measured from the anchor: the earliest `initial_timestamp` among the
//! records that pass the predicate.
//!
//!   index = floor((final_timestamp - anchor) / width)
//!
//! Buckets come out in ascending index order, each index at most once, and
//! empty indices are skipped. A record that finishes before the anchor lands
//! in a negative bucket.

use crate::model::interval::IntervalWidth;
use crate::model::record::NormalizedRecord;
use chrono::{DateTime, FixedOffset};

/// Inclusion predicate applied before the anchor is computed.
pub type Predicate<'p> = &'p dyn Fn(&NormalizedRecord) -> bool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<'a> {
    pub index: i64,
    /// Ordered by `final_timestamp`, ties in input order.
    pub records: Vec<&'a NormalizedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grouping<'a> {
    /// `None` when no record passed the predicate.
    pub anchor: Option<DateTime<FixedOffset>>,
    pub buckets: Vec<Bucket<'a>>,
}

impl Grouping<'_> {
    /// Records across all buckets, i.e. those that passed the predicate.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|b| b.records.len()).sum()
    }
}

pub fn group<'a>(
    records: &'a [NormalizedRecord],
    predicate: Option<Predicate<'_>>,
    width: IntervalWidth,
) -> Grouping<'a> {
    let mut included: Vec<&NormalizedRecord> = match predicate {
        Some(keep) => records.iter().filter(|r| keep(*r)).collect(),
        None => records.iter().collect(),
    };

    let Some(anchor) = included.iter().map(|r| r.initial_timestamp).min() else {
        tracing::debug!(total = records.len(), "no records left to group");
        return Grouping::default();
    };
    tracing::debug!(%anchor, included = included.len(), %width, "grouping anchor");

    // Stable: equal final timestamps keep input order.
    included.sort_by_key(|r| r.final_timestamp);

    // The index is monotone in final_timestamp, so equal indices are adjacent.
    let mut buckets: Vec<Bucket<'a>> = Vec::new();
    for record in included {
        let index = width.index_of(record.final_timestamp - anchor);
        match buckets.last_mut() {
            Some(bucket) if bucket.index == index => bucket.records.push(record),
            _ => buckets.push(Bucket {
                index,
                records: vec![record],
            }),
        }
    }

    Grouping {
        anchor: Some(anchor),
        buckets,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    pub(crate) fn base() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2021-03-01T10:00:00+00:00").unwrap()
    }

    /// Record starting `start_ms` and finishing `end_ms` after `base()`.
    pub(crate) fn rec(row: usize, start_ms: i64, end_ms: i64) -> NormalizedRecord {
        rec_with(row, start_ms, end_ms, &[])
    }

    pub(crate) fn rec_with(
        row: usize,
        start_ms: i64,
        end_ms: i64,
        fields: &[(&str, &str)],
    ) -> NormalizedRecord {
        let initial = base() + TimeDelta::milliseconds(start_ms);
        let fin = base() + TimeDelta::milliseconds(end_ms);
        NormalizedRecord {
            row,
            initial_timestamp: initial,
            final_timestamp: fin,
            latency: fin - initial,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn rows(bucket: &Bucket<'_>) -> Vec<usize> {
        bucket.records.iter().map(|r| r.row).collect()
    }

    #[test]
    fn splits_on_whole_seconds_from_anchor() {
        let records = vec![rec(1, 0, 200), rec(2, 100, 900), rec(3, 500, 1100)];
        let g = group(&records, None, IntervalWidth::default());

        assert_eq!(g.anchor, Some(base()));
        assert_eq!(g.buckets.len(), 2);
        assert_eq!((g.buckets[0].index, rows(&g.buckets[0])), (0, vec![1, 2]));
        assert_eq!((g.buckets[1].index, rows(&g.buckets[1])), (1, vec![3]));
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        let g = group(&[], None, IntervalWidth::default());
        assert_eq!(g, Grouping::default());
        assert!(g.buckets.is_empty());
    }

    #[test]
    fn predicate_rejecting_everything_yields_no_buckets() {
        let records = vec![rec(1, 0, 200)];
        let g = group(&records, Some(&|_: &NormalizedRecord| false), IntervalWidth::default());
        assert_eq!(g.anchor, None);
        assert!(g.buckets.is_empty());
    }

    #[test]
    fn anchor_comes_from_the_filtered_set() {
        // Only row 3 survives; its own start becomes the anchor.
        let records = vec![rec(1, 0, 200), rec(2, 100, 900), rec(3, 5_000, 5_400)];
        let keep = |r: &NormalizedRecord| r.row == 3;
        let g = group(&records, Some(&keep), IntervalWidth::default());

        assert_eq!(g.anchor, Some(base() + TimeDelta::milliseconds(5_000)));
        assert_eq!(g.buckets.len(), 1);
        assert_eq!((g.buckets[0].index, rows(&g.buckets[0])), (0, vec![3]));
    }

    #[test]
    fn skipped_indices_are_not_filled_in() {
        let records = vec![
            rec(1, 0, 3_100),
            rec(2, 0, 1_200),
            rec(3, 0, 3_900),
            rec(4, 0, 1_800),
        ];
        let g = group(&records, None, IntervalWidth::default());

        let indices: Vec<i64> = g.buckets.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(rows(&g.buckets[0]), vec![2, 4]);
        assert_eq!(rows(&g.buckets[1]), vec![1, 3]);
    }

    #[test]
    fn record_finishing_before_anchor_gets_negative_index() {
        // Row 2 starts last but finishes 0.5s before the anchor set by row 1.
        let records = vec![rec(1, 0, 300), rec(2, 1_000, -500)];
        let g = group(&records, None, IntervalWidth::default());

        let got: Vec<(i64, Vec<usize>)> = g.buckets.iter().map(|b| (b.index, rows(b))).collect();
        assert_eq!(got, vec![(-1, vec![2]), (0, vec![1])]);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![rec(1, 0, 500), rec(2, 10, 500), rec(3, 20, 400)];
        let g = group(&records, None, IntervalWidth::default());
        assert_eq!(rows(&g.buckets[0]), vec![3, 1, 2]);
    }

    #[test]
    fn respects_custom_width() {
        let records = vec![rec(1, 0, 200), rec(2, 0, 600), rec(3, 0, 1_100)];
        let width = IntervalWidth::new(TimeDelta::milliseconds(500)).unwrap();
        let g = group(&records, None, width);

        let got: Vec<(i64, Vec<usize>)> = g.buckets.iter().map(|b| (b.index, rows(b))).collect();
        assert_eq!(got, vec![(0, vec![1]), (1, vec![2]), (2, vec![3])]);
    }

    #[test]
    fn anchor_ignores_offsets() {
        // Same instant written with different offsets.
        let mut a = rec(1, 0, 1_500);
        a.initial_timestamp = DateTime::parse_from_rfc3339("2021-03-01T12:00:00+02:00").unwrap();
        a.latency = a.final_timestamp - a.initial_timestamp;
        let records = vec![a, rec(2, 100, 2_500)];
        let g = group(&records, None, IntervalWidth::default());

        assert_eq!(g.anchor.map(|t| t.timestamp_millis()), Some(base().timestamp_millis()));
        assert_eq!(g.buckets.iter().map(|b| b.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    fn arb_records() -> impl Strategy<Value = Vec<NormalizedRecord>> {
        prop::collection::vec((0i64..10_000, -2_000i64..20_000), 0..60).prop_map(|spans| {
            spans
                .into_iter()
                .enumerate()
                .map(|(i, (start, len))| {
                    let even = if i % 2 == 0 { "y" } else { "n" };
                    rec_with(i + 1, start, start + len, &[("even", even)])
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn grouping_invariants_hold(records in arb_records(), width_ms in 1i64..5_000, filtered in any::<bool>()) {
            let width = IntervalWidth::new(TimeDelta::milliseconds(width_ms)).unwrap();
            let keep = |r: &NormalizedRecord| r.field("even") == Some("y");
            let predicate: Option<Predicate<'_>> = if filtered { Some(&keep) } else { None };

            let g = group(&records, predicate, width);
            let again = group(&records, predicate, width);
            prop_assert_eq!(&g, &again);

            let included: Vec<&NormalizedRecord> = records
                .iter()
                .filter(|r| predicate.map(|p| p(*r)).unwrap_or(true))
                .collect();

            prop_assert_eq!(g.record_count(), included.len());
            prop_assert_eq!(g.anchor, included.iter().map(|r| r.initial_timestamp).min());

            for pair in g.buckets.windows(2) {
                prop_assert!(pair[0].index < pair[1].index);
            }
            for bucket in &g.buckets {
                prop_assert!(!bucket.records.is_empty());
                for pair in bucket.records.windows(2) {
                    prop_assert!(pair[0].final_timestamp <= pair[1].final_timestamp);
                }
            }
        }
    }
}
