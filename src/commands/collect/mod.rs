use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::CollectArgs;
use crate::error::PipelineError;
use crate::model::{
    CollectRunManifest, CollectedRecord, FailedBatch, SeedRecord, SnapshotEntry, SnapshotRow,
};
use crate::util::{
    SNAPSHOT_PREFIX, create_csv_writer, ensure_directory, now_utc_string, open_csv_reader,
    require_input, sha256_file, snapshot_file_name, utc_compact_string, write_json_pretty,
};

mod batch;
mod parse;
mod run;
mod select;
mod snapshot;
mod source;

pub use run::{default_snapshot_path, run};
pub use snapshot::{Snapshot, discover_snapshots, load_snapshot};

use batch::*;
use parse::*;
use select::*;
use snapshot::*;
use source::*;
