use crate::log::parse::parse_csv_file;
use crate::log::row::RawRecord;
use anyhow::Context;
use std::path::Path;

pub const PERF_LOG: &str = "perf.csv.gz";
pub const PROXY_STATS: &str = "dbproxy_stats.csv.gz";

/// The two logs of one benchmark run, as read from its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRun {
    /// Directory name of the run.
    pub name: String,
    pub perf: Vec<RawRecord>,
    /// One row per dbproxy.
    pub proxies: Vec<RawRecord>,
}

/// Read every run under `dir`: each subdirectory holds `perf.csv.gz` and
/// `dbproxy_stats.csv.gz`. Runs come back sorted by name; plain files in
/// `dir` are ignored.
pub fn parse_run_dir(dir: &str) -> anyhow::Result<Vec<RawRun>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("list run directory {}", dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list run directory {}", dir))?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    tracing::info!(dir, runs = names.len(), "found run directories");

    names
        .into_iter()
        .map(|name| {
            let run_dir = Path::new(dir).join(&name);
            let perf = parse_csv_file(&run_dir.join(PERF_LOG).to_string_lossy())?;
            let proxies = parse_csv_file(&run_dir.join(PROXY_STATS).to_string_lossy())?;
            tracing::debug!(run = %name, rows = perf.len(), proxies = proxies.len(), "parsed run");
            Ok(RawRun {
                name,
                perf,
                proxies,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;

    fn write_gz(path: &Path, text: &str) {
        let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        enc.write_all(text.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    fn write_run(root: &Path, name: &str, perf_rows: usize, proxies: usize) {
        let dir = root.join(name);
        std::fs::create_dir(&dir).unwrap();

        let mut perf = String::from("client_addr,request_result,initial_timestamp,final_timestamp\n");
        for i in 0..perf_rows {
            perf.push_str(&format!(
                "c{},Ok,2021-03-01T10:00:00Z,2021-03-01T10:00:0{}Z\n",
                i % 3,
                i % 10
            ));
        }
        write_gz(&dir.join(PERF_LOG), &perf);

        let mut stats = String::from("dbproxy,requests\n");
        for i in 0..proxies {
            stats.push_str(&format!("proxy{},10\n", i));
        }
        write_gz(&dir.join(PROXY_STATS), &stats);
    }

    #[test]
    fn reads_each_subdirectory_as_a_run() {
        let root = tempfile::tempdir().unwrap();
        write_run(root.path(), "run_b", 4, 2);
        write_run(root.path(), "run_a", 3, 1);
        std::fs::write(root.path().join("notes.txt"), "not a run").unwrap();

        let runs = parse_run_dir(root.path().to_str().unwrap()).unwrap();

        let shape: Vec<(&str, usize, usize)> = runs
            .iter()
            .map(|r| (r.name.as_str(), r.perf.len(), r.proxies.len()))
            .collect();
        assert_eq!(shape, vec![("run_a", 3, 1), ("run_b", 4, 2)]);
    }

    #[test]
    fn run_without_proxy_stats_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        write_run(root.path(), "run_a", 3, 1);
        std::fs::remove_file(root.path().join("run_a").join(PROXY_STATS)).unwrap();

        let err = parse_run_dir(root.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains(PROXY_STATS));
    }

    #[test]
    fn missing_directory_names_the_path() {
        let err = parse_run_dir("/nonexistent/runs").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/runs"));
    }
}
