use crate::model::{ReportData, ScalabilityData, Summary};
use crate::spec::LockTable;
use std::fmt::Write;

fn fmt_summary(s: &Summary) -> String {
    let geomean = s
        .geomean
        .map(|g| format!("{:.2}", g))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "[Mean: {:>4.2}] [SD: {:>4.2}] [Geomean: {:>4}] [Median: {:>4.2}]",
        s.mean, s.stddev, geomean, s.median
    )
}

/// Render the console report.
pub fn render_text_report(data: &ReportData) -> anyhow::Result<String> {
    let mut out = String::new();

    let filter = match (&data.filter.request_type, &data.filter.request_result) {
        (None, None) => "none".to_string(),
        (Some(t), None) => format!("request_type={}", t),
        (None, Some(r)) => format!("request_result={}", r),
        (Some(t), Some(r)) => format!("request_type={} request_result={}", t, r),
    };
    writeln!(out, "Interval: {}  Filter: {}", data.interval, filter)?;
    writeln!(
        out,
        "Requests: {} ({} included, {} clients)",
        data.totals.records, data.totals.included, data.totals.clients
    )?;
    if let Some(anchor) = &data.anchor {
        writeln!(out, "First timestamp: {}", anchor)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Throughput (#requests finished / {}) trajectory",
        data.interval
    )?;
    for p in &data.trajectory {
        writeln!(out, "  {:>6} {:>8}", p.index, p.count)?;
    }

    writeln!(out)?;
    match &data.throughput {
        Some(t) => {
            writeln!(
                out,
                "Peak throughput: {} requests in interval {}",
                t.peak.count, t.peak.index
            )?;
            if let Some(s) = &t.summary {
                writeln!(out, "Throughput {}", fmt_summary(s))?;
            }
        }
        None => writeln!(out, "Peak throughput: no requests matched the filter")?,
    }
    if let Some(s) = &data.latency {
        writeln!(out, "Latency (sec/request) {}", fmt_summary(s))?;
    }

    if !data.latency_by_type.is_empty() {
        writeln!(out)?;
        writeln!(out, "Request latency stats (sec/request)")?;
        for row in &data.latency_by_type {
            writeln!(
                out,
                "  {:<27} {:<6} {}",
                row.request_type,
                row.request_result,
                fmt_summary(&row.summary)
            )?;
        }
    }

    if !data.results_by_type.is_empty() {
        writeln!(out)?;
        writeln!(out, "Request result stats")?;
        for row in &data.results_by_type {
            writeln!(
                out,
                "  {:<27} {:>7} Ok {:>7} Err {:>9.2} %",
                row.request_type, row.ok, row.err, row.ok_percent
            )?;
        }
    }

    for bucket in &data.buckets {
        writeln!(out)?;
        writeln!(out, "Interval {}", bucket.index)?;
        for r in &bucket.records {
            let extra: Vec<String> = r.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            writeln!(
                out,
                "  row {:<6} {} -> {} ({:.6}s) {}",
                r.row,
                r.initial_timestamp,
                r.final_timestamp,
                r.latency_secs,
                extra.join(" ")
            )?;
        }
    }

    if !data.proxy_stats.is_empty() {
        writeln!(out)?;
        writeln!(out, "Proxy stats ({} proxies)", data.proxy_stats.len())?;
        for row in &data.proxy_stats {
            let cells: Vec<&str> = row.values().map(String::as_str).collect();
            writeln!(out, "  {}", cells.join(" "))?;
        }
    }

    Ok(out)
}

fn fmt_mean(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Render the multi-run table: one block per dbproxy count, one line per run.
pub fn render_scalability_report(data: &ScalabilityData) -> anyhow::Result<String> {
    let mut out = String::new();

    writeln!(
        out,
        "Scalability of throughput with varying number of clients and dbproxies"
    )?;
    writeln!(
        out,
        "Interval: {}  Runs: {} analyzed, {} excluded",
        data.interval,
        data.total_runs - data.excluded.len(),
        data.excluded.len()
    )?;
    if !data.excluded.is_empty() {
        writeln!(out, "Excluded (too few datapoints): {}", data.excluded.join(" "))?;
    }

    for series in &data.series {
        writeln!(out)?;
        writeln!(out, "{} dbproxies", series.proxies)?;
        writeln!(
            out,
            "  {:<24} {:>8} {:>10} {:>10} {:>16} {:>14}",
            "run",
            "clients",
            "requests",
            "ok",
            format!("req/{} (mean)", data.interval),
            "latency (sec)"
        )?;
        for p in &series.runs {
            writeln!(
                out,
                "  {:<24} {:>8} {:>10} {:>10} {:>16} {:>14}",
                p.name,
                p.clients,
                p.datapoints,
                p.successful,
                fmt_mean(p.mean_throughput),
                fmt_mean(p.mean_latency)
            )?;
        }
    }

    if data.series.is_empty() {
        writeln!(out)?;
        writeln!(out, "No runs left to analyze")?;
    }

    Ok(out)
}

/// One "BEGIN ..." line per request, or just the one asked for.
pub fn render_lock_sets(table: &LockTable, request: Option<&str>) -> anyhow::Result<String> {
    let mut out = String::new();
    let requests: Vec<&str> = match request {
        Some(r) => vec![r],
        None => table.requests().collect(),
    };
    for r in requests {
        writeln!(out, "{:<16} {}", r, table.begin_statement(r)?)?;
    }
    Ok(out)
}
