//! Record source: reads the per-request perf log (perf.csv / perf.csv.gz),
//! and directories of runs that each carry one.

pub mod parse;
pub mod row;
pub mod runs;

pub use parse::parse_csv_file;
pub use row::RawRecord;
pub use runs::{RawRun, parse_run_dir};
