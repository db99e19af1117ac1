//! Spec layer: JSON schemas + validated in-memory structures.
//!
//! This module is separate from log parsing and the analysis model.
//! It owns:
//! - AccessKind (table access and its merge rule)
//! - Lock table (request -> operations -> table accesses)

pub mod access;
pub mod locks;

pub use access::AccessKind;
pub use locks::{LockTable, LockTableSpec};
