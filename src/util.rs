use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const SNAPSHOT_PREFIX: &str = "bgg_data_";

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

/// File name of the snapshot collected on `date`, e.g. `bgg_data_2024-05-01.csv`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{SNAPSHOT_PREFIX}{}.csv", date.format("%Y-%m-%d"))
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn require_input(path: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_directory(path)?;

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Opens a CSV file for reading, skipping a leading UTF-8 byte order mark if present.
pub fn open_csv_reader(path: &Path) -> Result<csv::Reader<Cursor<Vec<u8>>>> {
    let mut raw =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw.starts_with(UTF8_BOM) {
        raw.drain(..UTF8_BOM.len());
    }

    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(raw)))
}

/// Creates a CSV file prefixed with a UTF-8 byte order mark so spreadsheet tools
/// keep non-ASCII names intact.
pub fn create_csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    ensure_parent_directory(path)?;

    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(csv::Writer::from_writer(file))
}

/// Cuts `value` to `digits` decimal places with floor semantics, so negative
/// values move away from zero: `-0.123` becomes `-0.13`.
pub fn truncate_decimals(value: f64, digits: i32) -> f64 {
    let factor = 10_f64.powi(digits);
    (value * factor).floor() / factor
}
