use super::*;

pub(super) const DEFAULT_PRIOR_MEAN: f64 = 5.5;
pub(super) const DEFAULT_PRIOR_WEIGHT: f64 = 2000.0;

/// Prior that every corrected rating is shrunk toward, weighted as if it had
/// `weight` ratings of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ShrinkagePrior {
    pub mean: f64,
    pub weight: f64,
}

impl Default for ShrinkagePrior {
    fn default() -> Self {
        Self {
            mean: DEFAULT_PRIOR_MEAN,
            weight: DEFAULT_PRIOR_WEIGHT,
        }
    }
}

impl ShrinkagePrior {
    pub(super) fn shrink(&self, rating_count: f64, corrected_rating: f64) -> f64 {
        (rating_count * corrected_rating + self.mean * self.weight) / (rating_count + self.weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub(super) fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares fit of `y = slope * x + intercept`.
///
/// When every `x` is the same the slope is undefined; the fit falls back to a
/// flat line through the mean of `y`. Returns `None` only for empty input.
pub(super) fn fit_linear(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let first_x = points[0].0;
    let constant_x = points.iter().all(|(x, _)| *x == first_x);

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });

    if constant_x || sxx == 0.0 {
        return Some(LinearFit {
            slope: 0.0,
            intercept: mean_y,
        });
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[derive(Debug, Clone)]
pub(super) struct Correction {
    pub records: Vec<EnrichedRecord>,
    pub fit: LinearFit,
    pub overall_mean: f64,
    pub excluded: usize,
}

/// Removes the complexity bias from every entry with a positive complexity
/// weight and shrinks the result toward `prior`.
///
/// Rating difference and rating change are cut to 2 decimals and the bayes
/// rating to 5; `new_rank` is left at zero.
pub(super) fn correct_ratings(
    entries: Vec<SnapshotEntry>,
    prior: ShrinkagePrior,
) -> Result<Correction, PipelineError> {
    let total = entries.len();
    let qualifying = entries
        .into_iter()
        .filter(|entry| entry.record.complexity_weight > 0.0)
        .collect::<Vec<SnapshotEntry>>();
    let excluded = total - qualifying.len();

    let points = qualifying
        .iter()
        .map(|entry| (entry.record.complexity_weight, entry.record.average_score))
        .collect::<Vec<(f64, f64)>>();
    let fit = fit_linear(&points).ok_or(PipelineError::EmptyDataset)?;

    let overall_mean =
        points.iter().map(|(_, average)| average).sum::<f64>() / points.len() as f64;

    let records = qualifying
        .into_iter()
        .map(|entry| {
            let record = entry.record;
            let predicted_average = fit.predict(record.complexity_weight);
            let rating_difference = record.average_score - predicted_average;
            let corrected_rating = rating_difference + overall_mean;
            let bayes_rating = prior.shrink(record.rating_count, corrected_rating);
            let rating_change = bayes_rating - record.average_score;

            EnrichedRecord {
                original_rank: entry.original_rank,
                predicted_average,
                rating_difference: truncate_decimals(rating_difference, 2),
                corrected_rating,
                bayes_rating: truncate_decimals(bayes_rating, 5),
                rating_change: truncate_decimals(rating_change, 2),
                new_rank: 0,
                record,
            }
        })
        .collect();

    Ok(Correction {
        records,
        fit,
        overall_mean,
        excluded,
    })
}
