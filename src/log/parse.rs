use crate::log::row::RawRecord;
use anyhow::{Context, bail};
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};

/// Parse a perf log into raw records, one per data row.
///
/// The file is a CSV table with a header row naming the columns, e.g.
/// client_addr,request_type,request_result,initial_timestamp,final_timestamp
///
/// Files ending in `gz` are decompressed on the fly.
pub fn parse_csv_file(path: &str) -> anyhow::Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("open log file {}", path))?;
    let reader: Box<dyn Read> = if path.ends_with("gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let records = parse_csv_reader(reader).with_context(|| format!("parse log file {}", path))?;
    tracing::info!(path, rows = records.len(), "parsed perf log");
    Ok(records)
}

/// Parse CSV text from any reader. The first row is the header.
pub fn parse_csv_reader<R: Read>(reader: R) -> anyhow::Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().context("read header row")?.clone();
    if headers.is_empty() {
        bail!("log has no header row");
    }

    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = result.with_context(|| format!("cannot parse row {}", row))?;

        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        out.push(RawRecord::new(row, fields));
    }

    Ok(out)
}
