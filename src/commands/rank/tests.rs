use crate::model::CollectedRecord;
use crate::util::open_csv_reader;

use super::*;

fn entry(id: u64, weight: f64, average: f64, count: f64) -> SnapshotEntry {
    SnapshotEntry {
        record: CollectedRecord {
            id,
            name: format!("Game {id}"),
            year_published: Some(2010),
            average_score: average,
            complexity_weight: weight,
            rating_count: count,
            recommended_sizes: vec!["3".to_string(), "4".to_string()],
            thumbnail_url: None,
        },
        original_rank: Some(id as i64),
    }
}

fn enriched(id: u64, bayes_rating: f64) -> EnrichedRecord {
    EnrichedRecord {
        record: entry(id, 2.0, 7.0, 100.0).record,
        original_rank: Some(id as i64),
        predicted_average: 7.0,
        rating_difference: 0.0,
        corrected_rating: 7.0,
        bayes_rating,
        rating_change: 0.0,
        new_rank: 0,
    }
}

#[test]
fn fit_linear_recovers_exact_line() {
    let fit = fit_linear(&[(1.0, 6.0), (2.0, 7.0), (3.0, 8.0)]).unwrap();

    assert_eq!(fit.slope, 1.0);
    assert_eq!(fit.intercept, 5.0);
    assert_eq!(fit.predict(4.0), 9.0);
}

#[test]
fn fit_linear_is_flat_for_constant_weight() {
    let fit = fit_linear(&[(2.0, 6.0), (2.0, 7.0), (2.0, 8.0)]).unwrap();

    assert_eq!(fit.slope, 0.0);
    assert_eq!(fit.intercept, 7.0);
    assert!(fit_linear(&[]).is_none());
}

#[test]
fn constant_weight_predicts_the_mean_average() {
    let entries = vec![
        entry(1, 2.0, 6.0, 10.0),
        entry(2, 2.0, 7.0, 10.0),
        entry(3, 2.0, 8.0, 10.0),
    ];

    let correction = correct_ratings(entries, ShrinkagePrior::default()).unwrap();

    assert!(correction
        .records
        .iter()
        .all(|record| record.predicted_average == 7.0));
    assert_eq!(correction.overall_mean, 7.0);
}

#[test]
fn correct_ratings_applies_residual_and_shrinkage() {
    let entries = vec![entry(1, 1.0, 6.0, 2000.0), entry(2, 3.0, 8.0, 0.0)];

    let correction = correct_ratings(entries, ShrinkagePrior::default()).unwrap();

    assert_eq!(correction.fit.slope, 1.0);
    assert_eq!(correction.fit.intercept, 5.0);
    assert_eq!(correction.overall_mean, 7.0);

    let first = &correction.records[0];
    assert_eq!(first.predicted_average, 6.0);
    assert_eq!(first.rating_difference, 0.0);
    assert_eq!(first.corrected_rating, 7.0);
    assert_eq!(first.bayes_rating, 6.25);
    assert_eq!(first.rating_change, 0.25);

    let second = &correction.records[1];
    assert_eq!(second.corrected_rating, 7.0);
    assert_eq!(second.bayes_rating, 5.5);
    assert_eq!(second.rating_change, -2.5);
}

#[test]
fn correct_ratings_excludes_zero_weight_records() {
    let entries = vec![
        entry(1, 0.0, 9.9, 50.0),
        entry(2, 2.0, 7.0, 50.0),
        entry(3, 3.0, 7.5, 50.0),
    ];

    let correction = correct_ratings(entries, ShrinkagePrior::default()).unwrap();

    assert_eq!(correction.excluded, 1);
    assert_eq!(
        correction
            .records
            .iter()
            .map(|record| record.record.id)
            .collect::<Vec<u64>>(),
        vec![2, 3]
    );
}

#[test]
fn correct_ratings_without_weights_is_an_empty_dataset() {
    let entries = vec![entry(1, 0.0, 7.0, 10.0), entry(2, 0.0, 8.0, 10.0)];

    let err = correct_ratings(entries, ShrinkagePrior::default()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyDataset));

    let err = correct_ratings(Vec::new(), ShrinkagePrior::default()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyDataset));
}

#[test]
fn correct_ratings_truncates_with_floor() {
    let entries = vec![
        entry(1, 1.0, 6.0, 0.0),
        entry(2, 2.0, 7.3, 0.0),
        entry(3, 3.0, 8.0, 0.0),
    ];

    let correction = correct_ratings(entries, ShrinkagePrior::default()).unwrap();

    let middle = &correction.records[1];
    let raw_difference = middle.record.average_score - middle.predicted_average;
    assert!(raw_difference > 0.19 && raw_difference < 0.21);
    assert_eq!(middle.rating_difference, truncate_decimals(raw_difference, 2));

    let outer = &correction.records[0];
    let raw_outer = outer.record.average_score - outer.predicted_average;
    assert!(raw_outer < 0.0);
    assert!(outer.rating_difference <= raw_outer);
    assert!(raw_outer - outer.rating_difference < 0.01);
}

#[test]
fn shrinkage_limits() {
    let prior = ShrinkagePrior::default();

    assert_eq!(prior.shrink(0.0, 8.7), 5.5);
    assert!((prior.shrink(1.0e12, 8.7) - 8.7).abs() < 1.0e-6);

    let moderate = prior.shrink(2000.0, 8.5);
    assert_eq!(moderate, 7.0);
}

#[test]
fn assign_ranks_sorts_descending_and_keeps_ties_stable() {
    let records = vec![enriched(1, 7.1), enriched(2, 7.1), enriched(3, 6.9)];

    let ranked = assign_ranks(records);

    assert_eq!(
        ranked
            .iter()
            .map(|record| (record.record.id, record.new_rank))
            .collect::<Vec<(u64, usize)>>(),
        vec![(1, 1), (2, 2), (3, 3)]
    );
}

#[test]
fn assign_ranks_puts_highest_bayes_first() {
    let records = vec![enriched(1, 6.0), enriched(2, 8.25), enriched(3, 7.0)];

    let ranked = assign_ranks(records);

    assert_eq!(
        ranked
            .iter()
            .map(|record| record.record.id)
            .collect::<Vec<u64>>(),
        vec![2, 3, 1]
    );
    assert_eq!(ranked[0].new_rank, 1);
    assert_eq!(ranked[2].new_rank, 3);
}

#[test]
fn single_unrated_record_lands_on_the_prior() {
    let correction =
        correct_ratings(vec![entry(100, 2.4, 7.9, 0.0)], ShrinkagePrior::default()).unwrap();

    let ranked = assign_ranks(correction.records);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].bayes_rating, DEFAULT_PRIOR_MEAN);
    assert_eq!(ranked[0].new_rank, 1);
}

#[test]
fn select_columns_drops_missing_original_rank() {
    let with_rank = select_columns(&RESULT_COLUMNS, true);
    let without_rank = select_columns(&RESULT_COLUMNS, false);

    assert_eq!(with_rank.len(), RESULT_COLUMNS.len());
    assert_eq!(without_rank.len(), RESULT_COLUMNS.len() - 1);
    assert!(!without_rank.contains(&ResultColumn::OriginalRank));
    assert_eq!(without_rank[0], ResultColumn::NewRank);
    assert_eq!(without_rank[1], ResultColumn::Id);
}

#[test]
fn write_result_table_uses_fixed_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardgames_re_ranked.csv");
    let mut record = enriched(42, 6.12345);
    record.new_rank = 1;
    record.rating_difference = -0.13;
    record.rating_change = -0.88;

    write_result_table(&path, &[record], &RESULT_COLUMNS).unwrap();

    let mut reader = open_csv_reader(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<&str>>(),
        vec![
            "new_rank",
            "original_rank",
            "id",
            "name",
            "year_published",
            "recommended_sizes",
            "complexity_weight",
            "average_score",
            "rating_difference",
            "bayes_rating",
            "rating_change",
        ]
    );
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(
        row.iter().collect::<Vec<&str>>(),
        vec![
            "1", "42", "42", "Game 42", "2010", "3,4", "2", "7", "-0.13", "6.12345", "-0.88",
        ]
    );
}

#[test]
fn render_preview_aligns_columns_and_limits_rows() {
    let mut first = enriched(1, 7.5);
    first.new_rank = 1;
    let mut second = enriched(22, 7.25);
    second.new_rank = 2;
    second.record.name = "Longer Name".to_string();
    let columns = [ResultColumn::NewRank, ResultColumn::Name, ResultColumn::BayesRating];

    let preview = render_preview(&[first.clone(), second.clone()], &columns, 1);
    let lines = preview.lines().collect::<Vec<&str>>();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "new_rank   name bayes_rating");
    assert_eq!(lines[1], "       1 Game 1          7.5");

    let full = render_preview(&[first, second], &columns, 10);
    assert_eq!(full.lines().count(), 3);
    assert!(full.contains("Longer Name"));
}
