//! Presentation: console text and JSON renderings of single-run and
//! scalability reports.

pub mod json;
pub mod text;

pub use json::render_json_report;
pub use text::{render_lock_sets, render_scalability_report, render_text_report};
