use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_ENDPOINT: &str = "https://boardgamegeek.com/xmlapi2/thing";

#[derive(Parser, Debug)]
#[command(
    name = "bgg-rerank",
    version,
    about = "Collect board game statistics and re-rank them with complexity bias removed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select the top-ranked games and fetch their statistics into a dated snapshot.
    Collect(CollectArgs),
    /// Correct a snapshot for complexity bias and write the re-ranked table.
    Rank(RankArgs),
    /// Report snapshots, the re-ranked table and the latest run manifests.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    #[arg(long, default_value = "boardgames_ranks.csv")]
    pub seed_path: PathBuf,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Overrides the date-stamped snapshot path inside --output-dir.
    #[arg(long)]
    pub snapshot_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 5000)]
    pub top_n: usize,

    #[arg(long, default_value_t = 20)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 2000)]
    pub batch_delay_ms: u64,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, default_value = concat!("bgg-rerank/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Defaults to today's date-stamped snapshot inside --output-dir.
    #[arg(long, conflicts_with = "latest")]
    pub snapshot_path: Option<PathBuf>,

    /// Use the newest date-stamped snapshot in --output-dir.
    #[arg(long, default_value_t = false)]
    pub latest: bool,

    #[arg(long, default_value = "boardgames_re_ranked.csv")]
    pub output_path: PathBuf,

    #[arg(long)]
    pub manifest_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 5.5)]
    pub prior_mean: f64,

    #[arg(long, default_value_t = 2000.0)]
    pub prior_weight: f64,

    #[arg(long, default_value_t = 100)]
    pub preview_rows: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "boardgames_re_ranked.csv")]
    pub output_path: PathBuf,

    #[arg(long)]
    pub manifest_dir: Option<PathBuf>,
}
