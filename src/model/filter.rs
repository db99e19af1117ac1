use crate::model::record::NormalizedRecord;
use serde::Serialize;

pub const CLIENT_ADDR: &str = "client_addr";
pub const REQUEST_TYPE: &str = "request_type";
pub const REQUEST_RESULT: &str = "request_result";

pub const RESULT_OK: &str = "Ok";
pub const RESULT_ERR: &str = "Err";

/// Selects records by request type and/or result. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordFilter {
    pub request_type: Option<String>,
    pub request_result: Option<String>,
}

impl RecordFilter {
    pub fn new(request_type: Option<&str>, request_result: Option<&str>) -> Self {
        Self {
            request_type: request_type.map(str::to_string),
            request_result: request_result.map(str::to_string),
        }
    }

    /// Only requests whose result is `Ok`.
    pub fn successful() -> Self {
        Self::new(None, Some(RESULT_OK))
    }

    pub fn is_empty(&self) -> bool {
        self.request_type.is_none() && self.request_result.is_none()
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        let field_is = |name: &str, want: &Option<String>| match want {
            Some(w) => record.field(name) == Some(w.as_str()),
            None => true,
        };
        field_is(REQUEST_TYPE, &self.request_type) && field_is(REQUEST_RESULT, &self.request_result)
    }

    pub fn apply<'a>(&self, records: &'a [NormalizedRecord]) -> Vec<&'a NormalizedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group::tests::rec_with;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            rec_with(1, 0, 10, &[(REQUEST_TYPE, "ReadOnly"), (REQUEST_RESULT, "Ok")]),
            rec_with(2, 0, 10, &[(REQUEST_TYPE, "ReadOnly"), (REQUEST_RESULT, "Err")]),
            rec_with(3, 0, 10, &[(REQUEST_TYPE, "Commit"), (REQUEST_RESULT, "Ok")]),
            rec_with(4, 0, 10, &[]),
        ]
    }

    fn rows(records: Vec<&NormalizedRecord>) -> Vec<usize> {
        records.into_iter().map(|r| r.row).collect()
    }

    #[test]
    fn empty_filter_matches_all() {
        let records = sample();
        assert!(RecordFilter::default().is_empty());
        assert_eq!(rows(RecordFilter::default().apply(&records)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filters_by_type_result_and_both() {
        let records = sample();
        assert_eq!(rows(RecordFilter::successful().apply(&records)), vec![1, 3]);
        assert_eq!(
            rows(RecordFilter::new(Some("ReadOnly"), None).apply(&records)),
            vec![1, 2]
        );
        assert_eq!(
            rows(RecordFilter::new(Some("ReadOnly"), Some(RESULT_ERR)).apply(&records)),
            vec![2]
        );
    }
}
