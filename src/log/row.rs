use std::collections::BTreeMap;

/// A single row from the perf log, all values kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(row: usize, fields: BTreeMap<String, String>) -> Self {
        Self { row, fields }
    }
}
