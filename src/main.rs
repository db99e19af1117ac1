use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod log;
mod model;
mod render;
mod spec;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "perflog-analyzer")]
#[command(about = "Throughput and latency analysis for load-test perf logs", long_about = None)]
struct Cli {
    /// Verbose diagnostics on stderr (otherwise RUST_LOG decides, default warn).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Throughput trajectory, peak and latency stats for a single run.
    Report {
        /// perf.csv or perf.csv.gz with initial_timestamp/final_timestamp columns.
        #[arg(long)]
        log: String,

        /// Bucket width, e.g. 1s, 500ms, 2m.
        #[arg(long, default_value = "1s")]
        interval: model::IntervalWidth,

        #[arg(long)]
        request_type: Option<String>,

        /// Defaults to Ok unless --all-results is given.
        #[arg(long, conflicts_with = "all_results")]
        request_result: Option<String>,

        /// Include failed requests in the throughput trajectory.
        #[arg(long)]
        all_results: bool,

        /// Also list the records of every bucket.
        #[arg(long)]
        detailed: bool,

        /// Write the report as JSON to this path.
        #[arg(long)]
        json: Option<String>,

        /// dbproxy_stats.csv[.gz] to append to the report.
        #[arg(long)]
        proxy_stats: Option<String>,
    },

    /// Scalability table over many runs: mean throughput and latency of
    /// successful requests, per dbproxy count and client count.
    Multi {
        /// Directory with one subdirectory per run, each holding perf.csv.gz
        /// and dbproxy_stats.csv.gz.
        dir: String,

        /// Bucket width used for the per-run mean throughput.
        #[arg(long, default_value = "1s")]
        interval: model::IntervalWidth,

        /// Write the table as JSON to this path.
        #[arg(long)]
        json: Option<String>,
    },

    /// Print the BEGIN lock statement of each web request.
    Locks {
        #[arg(long)]
        table: String,

        #[arg(long)]
        request: Option<String>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.cmd {
        Commands::Report {
            log,
            interval,
            request_type,
            request_result,
            all_results,
            detailed,
            json,
            proxy_stats,
        } => {
            // 1) Read + normalize the perf log.
            let raw = log::parse_csv_file(&log)?;
            let records =
                model::normalize(raw).with_context(|| format!("normalize records in {}", log))?;

            // 2) Group + aggregate.
            let filter = match (all_results, request_result) {
                (true, _) => model::RecordFilter::new(request_type.as_deref(), None),
                (false, None) => model::RecordFilter {
                    request_type,
                    ..model::RecordFilter::successful()
                },
                (false, Some(result)) => {
                    model::RecordFilter::new(request_type.as_deref(), Some(result.as_str()))
                }
            };
            let mut data = model::build_report_data(&records, &filter, interval, detailed)?;

            if let Some(path) = proxy_stats {
                data.proxy_stats = log::parse_csv_file(&path)?
                    .into_iter()
                    .map(|r| r.fields)
                    .collect();
            }

            // 3) Render.
            print!("{}", render::render_text_report(&data)?);
            if let Some(path) = json {
                std::fs::write(&path, render::render_json_report(&data)?)
                    .with_context(|| format!("write {}", path))?;
                println!("Wrote {}", path);
            }
        }
        Commands::Multi {
            dir,
            interval,
            json,
        } => {
            // 1) Read + normalize every run.
            let runs = log::parse_run_dir(&dir)?
                .into_iter()
                .map(|raw| {
                    let name = raw.name.clone();
                    model::Run::from_raw(raw).with_context(|| format!("normalize run {}", name))
                })
                .collect::<Result<Vec<_>>>()?;

            // 2) Drop thin runs, aggregate the rest.
            let data = model::build_scalability(runs, interval)?;

            // 3) Render.
            print!("{}", render::render_scalability_report(&data)?);
            if let Some(path) = json {
                std::fs::write(&path, render::render_json_report(&data)?)
                    .with_context(|| format!("write {}", path))?;
                println!("Wrote {}", path);
            }
        }
        Commands::Locks { table, request } => {
            let text = std::fs::read_to_string(&table).with_context(|| format!("read {}", table))?;
            let lock_spec: spec::LockTableSpec =
                serde_json::from_str(&text).with_context(|| format!("parse {}", table))?;
            let locks = lock_spec.validate_and_build()?;

            print!("{}", render::render_lock_sets(&locks, request.as_deref())?);
        }
    }

    Ok(())
}
