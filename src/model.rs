use serde::{Deserialize, Serialize};

/// One row of the upstream ranks export. Only `id` and `rank` are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRecord {
    pub id: u64,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedRecord {
    pub id: u64,
    pub name: String,
    pub year_published: Option<i32>,
    pub average_score: f64,
    pub complexity_weight: f64,
    pub rating_count: f64,
    pub recommended_sizes: Vec<String>,
    pub thumbnail_url: Option<String>,
}

/// A collected record joined with the rank it was selected under.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub record: CollectedRecord,
    pub original_rank: Option<i64>,
}

/// Flat CSV form of [`SnapshotEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: u64,
    pub name: String,
    pub year_published: Option<i32>,
    pub average_score: f64,
    pub complexity_weight: f64,
    pub rating_count: f64,
    #[serde(default)]
    pub recommended_sizes: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub original_rank: Option<i64>,
}

pub const SIZE_SEPARATOR: &str = ",";

impl From<&SnapshotEntry> for SnapshotRow {
    fn from(entry: &SnapshotEntry) -> Self {
        let record = &entry.record;
        Self {
            id: record.id,
            name: record.name.clone(),
            year_published: record.year_published,
            average_score: record.average_score,
            complexity_weight: record.complexity_weight,
            rating_count: record.rating_count,
            recommended_sizes: join_sizes(&record.recommended_sizes),
            thumbnail_url: record.thumbnail_url.clone(),
            original_rank: entry.original_rank,
        }
    }
}

impl From<SnapshotRow> for SnapshotEntry {
    fn from(row: SnapshotRow) -> Self {
        let recommended_sizes = row
            .recommended_sizes
            .split(SIZE_SEPARATOR)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        Self {
            record: CollectedRecord {
                id: row.id,
                name: row.name,
                year_published: row.year_published,
                average_score: row.average_score,
                complexity_weight: row.complexity_weight,
                rating_count: row.rating_count,
                recommended_sizes,
                thumbnail_url: row.thumbnail_url,
            },
            original_rank: row.original_rank,
        }
    }
}

pub fn join_sizes(sizes: &[String]) -> String {
    sizes.join(SIZE_SEPARATOR)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: CollectedRecord,
    pub original_rank: Option<i64>,
    pub predicted_average: f64,
    pub rating_difference: f64,
    pub corrected_rating: f64,
    pub bayes_rating: f64,
    pub rating_change: f64,
    /// 1-based position after sorting; zero until ranks are assigned.
    pub new_rank: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedBatch {
    pub batch_index: usize,
    pub first_id: u64,
    pub last_id: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub seed_path: String,
    pub seed_sha256: String,
    pub endpoint: String,
    pub top_n: usize,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub selected_count: usize,
    pub batch_count: usize,
    pub failed_batches: Vec<FailedBatch>,
    pub collected_count: usize,
    pub snapshot_row_count: usize,
    pub snapshot_path: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub slope: f64,
    pub intercept: f64,
    pub overall_mean: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub generated_at: String,
    pub snapshot_path: String,
    pub snapshot_row_count: usize,
    pub qualifying_count: usize,
    pub excluded_count: usize,
    pub regression: Option<RegressionSummary>,
    pub prior_mean: f64,
    pub prior_weight: f64,
    pub output_path: Option<String>,
    pub warnings: Vec<String>,
}
