use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{Local, Utc};
use tracing::{debug, info, warn};

use crate::cli::RankArgs;
use crate::commands::collect::{Snapshot, default_snapshot_path, discover_snapshots, load_snapshot};
use crate::error::PipelineError;
use crate::model::{
    EnrichedRecord, RankRunManifest, RegressionSummary, SnapshotEntry, join_sizes,
};
use crate::util::{
    create_csv_writer, ensure_directory, now_utc_string, truncate_decimals, utc_compact_string,
    write_json_pretty,
};

mod correct;
mod order;
mod output;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;

use correct::*;
use order::*;
use output::*;
