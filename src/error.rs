use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("batch {batch} failed: {reason}")]
    TransportFailure { batch: usize, reason: String },

    #[error("item {id}: field `{field}` is missing or not numeric (got {value:?})")]
    MalformedRecord {
        id: u64,
        field: &'static str,
        value: Option<String>,
    },

    #[error("no records with a positive complexity weight")]
    EmptyDataset,
}
