use super::*;

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<SnapshotEntry>,
    /// False when the file predates rank joining and has no `original_rank` column.
    pub has_original_rank: bool,
}

/// Inner join of collected records with the selected seeds on `id`.
///
/// Seeds without a collected record (failed batch, or omitted upstream) are
/// dropped, and so are records the seeds never asked for.
pub(super) fn join_with_seeds(
    records: &[CollectedRecord],
    seeds: &[SeedRecord],
) -> Vec<SnapshotEntry> {
    let ranks = seeds
        .iter()
        .map(|seed| (seed.id, seed.rank))
        .collect::<HashMap<u64, i64>>();

    records
        .iter()
        .filter_map(|record| {
            ranks.get(&record.id).map(|rank| SnapshotEntry {
                record: record.clone(),
                original_rank: Some(*rank),
            })
        })
        .collect()
}

pub(super) fn write_snapshot(path: &Path, entries: &[SnapshotEntry]) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    for entry in entries {
        writer
            .serialize(SnapshotRow::from(entry))
            .with_context(|| format!("failed to write snapshot row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    require_input(path).context("collect a snapshot first with `bgg-rerank collect`")?;

    let mut reader = open_csv_reader(path)?;
    let has_original_rank = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .iter()
        .any(|header| header == "original_rank");

    let mut entries = Vec::new();
    for (idx, result) in reader.deserialize::<SnapshotRow>().enumerate() {
        let row = result.with_context(|| {
            format!("failed to read snapshot row {} of {}", idx + 1, path.display())
        })?;
        entries.push(SnapshotEntry::from(row));
    }

    Ok(Snapshot {
        entries,
        has_original_rank,
    })
}

/// Date-stamped snapshots in `dir`, oldest first.
pub fn discover_snapshots(dir: &Path) -> Result<Vec<(NaiveDate, PathBuf)>> {
    let pattern = Regex::new(&format!(
        r"^{}(\d{{4}}-\d{{2}}-\d{{2}})\.csv$",
        regex::escape(SNAPSHOT_PREFIX)
    ))
    .context("failed to compile snapshot filename regex")?;

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(date) = pattern
            .captures(filename)
            .and_then(|captures| captures.get(1))
            .and_then(|value| NaiveDate::parse_from_str(value.as_str(), "%Y-%m-%d").ok())
        else {
            continue;
        };

        snapshots.push((date, path));
    }

    snapshots.sort();
    Ok(snapshots)
}
