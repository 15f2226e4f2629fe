use super::*;

/// Sorts by bayes rating, highest first, and numbers the result from 1.
/// Equal ratings keep their incoming order.
pub(super) fn assign_ranks(mut records: Vec<EnrichedRecord>) -> Vec<EnrichedRecord> {
    records.sort_by(|a, b| b.bayes_rating.total_cmp(&a.bayes_rating));
    for (index, record) in records.iter_mut().enumerate() {
        record.new_rank = index + 1;
    }
    records
}
