//! Lock table (locks.json): which tables each web request touches.
//!
//! JSON shape:
//! {
//!   "operations": {
//!     "getName":    { "customer": "R" },
//!     "addItemPut": { "shopping_cart_line": "W" }
//!   },
//!   "requests": {
//!     "home":     ["getName", "getRelated"],   // sub-operations, in order
//!     "shopCart": ["createEmptyCart", "addItem", "addItemPut"]
//!   }
//! }
//!
//! A request runs as one transaction, so its lock set is the merge of the
//! table accesses of all its operations (see `AccessKind::merge`).

use crate::error::{AnalyzeError, Result};
use crate::spec::AccessKind;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Table name -> access kind for a single SQL operation.
pub type TableAccess = BTreeMap<String, AccessKind>;

#[derive(Debug, Clone, Deserialize)]
pub struct LockTableSpec {
    #[serde(default)]
    pub operations: BTreeMap<String, TableAccess>,

    #[serde(default)]
    pub requests: BTreeMap<String, Vec<String>>,
}

/// Validated lock table. Immutable once built.
#[derive(Debug, Clone)]
pub struct LockTable {
    operations: BTreeMap<String, TableAccess>,
    requests: BTreeMap<String, Vec<String>>,
}

impl LockTableSpec {
    /// Check that names are non-empty and every referenced operation exists.
    pub fn validate_and_build(self) -> Result<LockTable> {
        if self.requests.is_empty() {
            return Err(AnalyzeError::InvalidLockTable(
                "locks.json contained no requests".to_string(),
            ));
        }

        for (op, tables) in &self.operations {
            if op.trim().is_empty() {
                return Err(AnalyzeError::InvalidLockTable(
                    "operation name cannot be empty".to_string(),
                ));
            }
            if tables.keys().any(|t| t.trim().is_empty()) {
                return Err(AnalyzeError::InvalidLockTable(format!(
                    "operation '{}' has an empty table name",
                    op
                )));
            }
        }

        for (request, ops) in &self.requests {
            if let Some(missing) = ops.iter().find(|op| !self.operations.contains_key(*op)) {
                return Err(AnalyzeError::UnknownOperation {
                    request: request.clone(),
                    operation: missing.clone(),
                });
            }
        }

        Ok(LockTable {
            operations: self.operations,
            requests: self.requests,
        })
    }
}

impl LockTable {
    pub fn requests(&self) -> impl Iterator<Item = &str> {
        self.requests.keys().map(String::as_str)
    }

    /// Tables locked by `request`, in order of first use.
    pub fn lock_set(&self, request: &str) -> Result<Vec<(String, AccessKind)>> {
        let ops = self
            .requests
            .get(request)
            .ok_or_else(|| AnalyzeError::UnknownRequest(request.to_string()))?;

        let mut out: Vec<(String, AccessKind)> = Vec::new();
        for op in ops {
            let tables = self
                .operations
                .get(op)
                .ok_or_else(|| AnalyzeError::UnknownOperation {
                    request: request.to_string(),
                    operation: op.clone(),
                })?;

            for (table, &requested) in tables {
                match out.iter_mut().find(|(t, _)| t == table) {
                    Some((_, held)) => *held = AccessKind::merge(Some(*held), requested),
                    None => out.push((table.clone(), AccessKind::merge(None, requested))),
                }
            }
        }

        Ok(out)
    }

    /// "BEGIN <table> <R|W> ..." for `request`.
    pub fn begin_statement(&self, request: &str) -> Result<String> {
        let mut parts = vec!["BEGIN".to_string()];
        for (table, kind) in self.lock_set(request)? {
            parts.push(table);
            parts.push(kind.to_string());
        }
        Ok(parts.join(" "))
    }
}
