use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ResultColumn {
    NewRank,
    OriginalRank,
    Id,
    Name,
    YearPublished,
    RecommendedSizes,
    ComplexityWeight,
    AverageScore,
    RatingDifference,
    BayesRating,
    RatingChange,
}

pub(super) const RESULT_COLUMNS: [ResultColumn; 11] = [
    ResultColumn::NewRank,
    ResultColumn::OriginalRank,
    ResultColumn::Id,
    ResultColumn::Name,
    ResultColumn::YearPublished,
    ResultColumn::RecommendedSizes,
    ResultColumn::ComplexityWeight,
    ResultColumn::AverageScore,
    ResultColumn::RatingDifference,
    ResultColumn::BayesRating,
    ResultColumn::RatingChange,
];

pub(super) const PREVIEW_COLUMNS: [ResultColumn; 7] = [
    ResultColumn::NewRank,
    ResultColumn::OriginalRank,
    ResultColumn::Name,
    ResultColumn::YearPublished,
    ResultColumn::RecommendedSizes,
    ResultColumn::ComplexityWeight,
    ResultColumn::BayesRating,
];

impl ResultColumn {
    pub(super) fn header(self) -> &'static str {
        match self {
            Self::NewRank => "new_rank",
            Self::OriginalRank => "original_rank",
            Self::Id => "id",
            Self::Name => "name",
            Self::YearPublished => "year_published",
            Self::RecommendedSizes => "recommended_sizes",
            Self::ComplexityWeight => "complexity_weight",
            Self::AverageScore => "average_score",
            Self::RatingDifference => "rating_difference",
            Self::BayesRating => "bayes_rating",
            Self::RatingChange => "rating_change",
        }
    }

    pub(super) fn value(self, record: &EnrichedRecord) -> String {
        match self {
            Self::NewRank => record.new_rank.to_string(),
            Self::OriginalRank => optional(record.original_rank),
            Self::Id => record.record.id.to_string(),
            Self::Name => record.record.name.clone(),
            Self::YearPublished => optional(record.record.year_published),
            Self::RecommendedSizes => join_sizes(&record.record.recommended_sizes),
            Self::ComplexityWeight => record.record.complexity_weight.to_string(),
            Self::AverageScore => record.record.average_score.to_string(),
            Self::RatingDifference => record.rating_difference.to_string(),
            Self::BayesRating => record.bayes_rating.to_string(),
            Self::RatingChange => record.rating_change.to_string(),
        }
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Drops `original_rank` when the snapshot never carried it.
pub(super) fn select_columns(columns: &[ResultColumn], has_original_rank: bool) -> Vec<ResultColumn> {
    columns
        .iter()
        .copied()
        .filter(|column| has_original_rank || *column != ResultColumn::OriginalRank)
        .collect()
}

pub(super) fn write_result_table(
    path: &Path,
    records: &[EnrichedRecord],
    columns: &[ResultColumn],
) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    writer.write_record(columns.iter().map(|column| column.header()))?;
    for record in records {
        writer.write_record(columns.iter().map(|column| column.value(record)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Right-aligned text table of the first `limit` records.
pub(super) fn render_preview(
    records: &[EnrichedRecord],
    columns: &[ResultColumn],
    limit: usize,
) -> String {
    let rows = records
        .iter()
        .take(limit)
        .map(|record| {
            columns
                .iter()
                .map(|column| column.value(record))
                .collect::<Vec<String>>()
        })
        .collect::<Vec<Vec<String>>>();

    let widths = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.header().len()))
                .max()
                .unwrap_or_default()
        })
        .collect::<Vec<usize>>();

    let mut out = String::new();
    let headers = columns
        .iter()
        .map(|column| column.header().to_string())
        .collect::<Vec<String>>();
    push_line(&mut out, &headers, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{cell}", " ".repeat(pad))
        })
        .collect::<Vec<String>>()
        .join(" ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub(super) fn print_preview(preview: &str, shown: usize) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "--- Top {shown} Re-ranked Board Games ---")?;
    write!(output, "{preview}")?;
    output.flush()?;
    Ok(())
}
