use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::collect::{discover_snapshots, load_snapshot};
use crate::model::{CollectRunManifest, RankRunManifest};
use crate::util::open_csv_reader;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args
        .manifest_dir
        .clone()
        .unwrap_or_else(|| args.output_dir.join("manifests"));

    info!(output_dir = %args.output_dir.display(), "status requested");

    let snapshots = if args.output_dir.is_dir() {
        discover_snapshots(&args.output_dir)?
    } else {
        warn!(path = %args.output_dir.display(), "output directory missing");
        Vec::new()
    };

    if snapshots.is_empty() {
        warn!(path = %args.output_dir.display(), "no date-stamped snapshots found");
    }
    for (date, path) in &snapshots {
        match load_snapshot(path) {
            Ok(snapshot) => info!(
                date = %date,
                path = %path.display(),
                rows = snapshot.entries.len(),
                has_original_rank = snapshot.has_original_rank,
                "snapshot"
            ),
            Err(err) => warn!(path = %path.display(), error = %format!("{err:#}"), "unreadable snapshot"),
        }
    }

    if args.output_path.is_file() {
        let rows = count_csv_rows(&args.output_path)?;
        info!(path = %args.output_path.display(), rows, "re-ranked table");
    } else {
        warn!(path = %args.output_path.display(), "re-ranked table missing");
    }

    match latest_manifest::<CollectRunManifest>(&manifest_dir, "collect_run_")? {
        Some((path, manifest)) => info!(
            path = %path.display(),
            run_id = %manifest.run_id,
            status = %manifest.status,
            finished_at = %manifest.finished_at,
            selected = manifest.selected_count,
            collected = manifest.collected_count,
            failed_batches = manifest.failed_batches.len(),
            snapshot = %manifest.snapshot_path.unwrap_or_default(),
            "latest collect run"
        ),
        None => warn!(path = %manifest_dir.display(), "no collect manifest found"),
    }

    match latest_manifest::<RankRunManifest>(&manifest_dir, "rank_run_")? {
        Some((path, manifest)) => info!(
            path = %path.display(),
            run_id = %manifest.run_id,
            status = %manifest.status,
            generated_at = %manifest.generated_at,
            qualifying = manifest.qualifying_count,
            excluded = manifest.excluded_count,
            slope = manifest.regression.as_ref().map(|value| value.slope).unwrap_or_default(),
            intercept = manifest.regression.as_ref().map(|value| value.intercept).unwrap_or_default(),
            "latest rank run"
        ),
        None => warn!(path = %manifest_dir.display(), "no rank manifest found"),
    }

    Ok(())
}

fn count_csv_rows(path: &Path) -> Result<usize> {
    let mut reader = open_csv_reader(path)?;
    let mut rows = 0usize;
    for record in reader.records() {
        record.with_context(|| format!("failed to read {}", path.display()))?;
        rows += 1;
    }
    Ok(rows)
}

/// Newest manifest whose file name starts with `prefix`. Names embed a compact
/// UTC timestamp, so lexical order is chronological.
fn latest_manifest<T: DeserializeOwned>(
    manifest_dir: &Path,
    prefix: &str,
) -> Result<Option<(PathBuf, T)>> {
    if !manifest_dir.is_dir() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(prefix) && name.ends_with(".json"))
            .unwrap_or(false);
        if matches {
            candidates.push(path);
        }
    }
    candidates.sort();

    let Some(path) = candidates.pop() else {
        return Ok(None);
    };
    let raw = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: T = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(Some((path, manifest)))
}
