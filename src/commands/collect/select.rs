use serde::Deserialize;

use super::*;

#[derive(Debug, Deserialize)]
struct SeedRow {
    id: u64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rank: Option<i64>,
}

/// Loads the ranks export. Rows whose rank is blank or not a number come back
/// with rank 0 so the selector treats them as unranked.
pub(super) fn load_seed_records(path: &Path) -> Result<Vec<SeedRecord>> {
    require_input(path).context("the seed ranks export is required to select games")?;

    let mut reader = open_csv_reader(path)?;
    let mut seeds = Vec::new();

    for (idx, result) in reader.deserialize::<SeedRow>().enumerate() {
        let row = result.with_context(|| {
            format!("failed to read seed row {} of {}", idx + 1, path.display())
        })?;
        seeds.push(SeedRecord {
            id: row.id,
            rank: row.rank.unwrap_or(0),
        });
    }

    Ok(seeds)
}

/// Returns up to `limit` ranked records in ascending rank order. Equal ranks
/// keep their input order.
pub(super) fn select_top(seeds: &[SeedRecord], limit: usize) -> Vec<SeedRecord> {
    let mut ranked = seeds
        .iter()
        .filter(|seed| seed.rank > 0)
        .copied()
        .collect::<Vec<SeedRecord>>();

    ranked.sort_by_key(|seed| seed.rank);
    ranked.truncate(limit);
    ranked
}
