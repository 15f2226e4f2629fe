use super::*;

#[derive(Debug, Default)]
pub(super) struct CollectOutcome {
    pub records: Vec<CollectedRecord>,
    pub batch_count: usize,
    pub failed_batches: Vec<FailedBatch>,
}

/// Splits `ids` into consecutive batches of at most `batch_size`, keeping order.
pub(super) fn partition_batches(ids: &[u64], batch_size: usize) -> Vec<&[u64]> {
    ids.chunks(batch_size.max(1)).collect()
}

/// Fetches every batch in order, one request at a time, sleeping `delay`
/// between consecutive requests.
///
/// A batch whose request or response fails is logged and skipped. An item
/// with unreadable rating statistics aborts the collection.
pub(super) fn collect_batches<S: ThingSource + ?Sized>(
    source: &S,
    ids: &[u64],
    batch_size: usize,
    delay: Duration,
) -> Result<CollectOutcome, PipelineError> {
    let batches = partition_batches(ids, batch_size);
    let batch_count = batches.len();
    let mut outcome = CollectOutcome {
        batch_count,
        ..CollectOutcome::default()
    };

    for (batch_index, batch_ids) in batches.into_iter().enumerate() {
        if batch_index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        match fetch_and_parse(source, batch_ids, batch_index) {
            Ok(records) => {
                info!(
                    batch = batch_index + 1,
                    batches = batch_count,
                    requested = batch_ids.len(),
                    parsed = records.len(),
                    "batch collected"
                );
                outcome.records.extend(records);
            }
            Err(PipelineError::TransportFailure { batch, reason }) => {
                warn!(
                    batch = batch + 1,
                    batches = batch_count,
                    first_id = batch_ids.first().copied().unwrap_or_default(),
                    last_id = batch_ids.last().copied().unwrap_or_default(),
                    error = %reason,
                    "batch failed; skipping"
                );
                outcome.failed_batches.push(FailedBatch {
                    batch_index: batch,
                    first_id: batch_ids.first().copied().unwrap_or_default(),
                    last_id: batch_ids.last().copied().unwrap_or_default(),
                    reason,
                });
            }
            Err(other) => return Err(other),
        }
    }

    outcome.records = order_by_selection(outcome.records, ids);
    Ok(outcome)
}

fn fetch_and_parse<S: ThingSource + ?Sized>(
    source: &S,
    batch_ids: &[u64],
    batch_index: usize,
) -> Result<Vec<CollectedRecord>, PipelineError> {
    let body = source
        .fetch_batch(batch_ids)
        .map_err(|err| PipelineError::TransportFailure {
            batch: batch_index,
            reason: format!("{err:#}"),
        })?;

    parse_items(&body, batch_index)
}

/// Stable-sorts records into the order their ids were selected in. Ids the
/// upstream returned without being asked for go last.
fn order_by_selection(mut records: Vec<CollectedRecord>, ids: &[u64]) -> Vec<CollectedRecord> {
    let positions = ids
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect::<HashMap<u64, usize>>();

    records.sort_by_key(|record| {
        positions
            .get(&record.id)
            .copied()
            .unwrap_or(usize::MAX)
    });
    records
}
