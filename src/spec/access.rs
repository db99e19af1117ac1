//! Table access kind used in lock sets.
//!
//! JSON accepts "R"/"W" (as written by the load generator) or "read"/"write".

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    #[serde(rename = "R", alias = "read", alias = "r")]
    Read,
    #[serde(rename = "W", alias = "write", alias = "w")]
    Write,
}

impl AccessKind {
    /// Combine the access already held on a table with a newly requested one.
    ///
    /// Rules, in order:
    /// 1. nothing held: take the request
    /// 2. write held or requested: write
    /// 3. otherwise: read
    pub fn merge(held: Option<AccessKind>, requested: AccessKind) -> AccessKind {
        match (held, requested) {
            (None, requested) => requested,
            (Some(AccessKind::Write), _) | (Some(_), AccessKind::Write) => AccessKind::Write,
            (Some(AccessKind::Read), AccessKind::Read) => AccessKind::Read,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "R",
            AccessKind::Write => "W",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
