//! Typed errors raised by the analysis core and the lock table.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    /// A required timestamp field is missing or does not parse.
    #[error("malformed record at row {record}: field '{field}' {reason}")]
    MalformedRecord {
        record: usize,
        field: String,
        reason: String,
    },

    /// `peak` was asked for the maximum of an empty trajectory.
    #[error("peak throughput is undefined for an empty trajectory")]
    EmptyTrajectory,

    #[error("invalid interval width: {0}")]
    InvalidInterval(String),

    #[error("unknown request type '{0}' in lock table")]
    UnknownRequest(String),

    #[error("request '{request}' references unknown operation '{operation}'")]
    UnknownOperation { request: String, operation: String },

    #[error("invalid lock table: {0}")]
    InvalidLockTable(String),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
