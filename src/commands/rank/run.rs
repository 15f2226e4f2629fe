use super::*;

pub fn run(args: RankArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("rank-{}", utc_compact_string(started_ts));

    if !args.prior_weight.is_finite() || args.prior_weight <= 0.0 {
        bail!("--prior-weight must be a positive number, got {}", args.prior_weight);
    }
    if !args.prior_mean.is_finite() {
        bail!("--prior-mean must be a finite number, got {}", args.prior_mean);
    }
    let prior = ShrinkagePrior {
        mean: args.prior_mean,
        weight: args.prior_weight,
    };

    let snapshot_path = resolve_snapshot_path(&args)?;
    let manifest_dir = args
        .manifest_dir
        .clone()
        .unwrap_or_else(|| args.output_dir.join("manifests"));

    info!(run_id = %run_id, snapshot = %snapshot_path.display(), "starting rank");

    let Snapshot {
        entries,
        has_original_rank,
    } = load_snapshot(&snapshot_path)?;
    let snapshot_row_count = entries.len();
    info!(rows = snapshot_row_count, "loaded snapshot");

    let mut manifest = RankRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        generated_at: now_utc_string(),
        snapshot_path: snapshot_path.display().to_string(),
        snapshot_row_count,
        qualifying_count: 0,
        excluded_count: snapshot_row_count,
        regression: None,
        prior_mean: prior.mean,
        prior_weight: prior.weight,
        output_path: None,
        warnings: Vec::new(),
    };

    let correction = match correct_ratings(entries, prior) {
        Ok(correction) => correction,
        Err(PipelineError::EmptyDataset) => {
            warn!(
                rows = snapshot_row_count,
                "no records with a complexity weight; nothing to rank"
            );
            manifest.status = "empty_dataset".to_string();
            manifest
                .warnings
                .push(PipelineError::EmptyDataset.to_string());
            write_manifest(&manifest_dir, started_ts, &manifest)?;
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    info!(
        slope = correction.fit.slope,
        intercept = correction.fit.intercept,
        overall_mean = correction.overall_mean,
        qualifying = correction.records.len(),
        excluded = correction.excluded,
        "fitted average = {:.4} * weight + {:.4}",
        correction.fit.slope,
        correction.fit.intercept
    );

    manifest.qualifying_count = correction.records.len();
    manifest.excluded_count = correction.excluded;
    manifest.regression = Some(RegressionSummary {
        slope: correction.fit.slope,
        intercept: correction.fit.intercept,
        overall_mean: correction.overall_mean,
    });

    let ranked = assign_ranks(correction.records);
    for record in &ranked {
        debug!(
            new_rank = record.new_rank,
            id = record.record.id,
            predicted_average = record.predicted_average,
            corrected_rating = record.corrected_rating,
            bayes_rating = record.bayes_rating,
            "ranked"
        );
    }
    let columns = select_columns(&RESULT_COLUMNS, has_original_rank);
    write_result_table(&args.output_path, &ranked, &columns)?;
    info!(
        path = %args.output_path.display(),
        rows = ranked.len(),
        "wrote re-ranked table"
    );
    manifest.output_path = Some(args.output_path.display().to_string());

    if args.preview_rows > 0 {
        let preview_columns = select_columns(&PREVIEW_COLUMNS, has_original_rank);
        let preview = render_preview(&ranked, &preview_columns, args.preview_rows);
        print_preview(&preview, args.preview_rows.min(ranked.len()))?;
    }

    write_manifest(&manifest_dir, started_ts, &manifest)?;
    info!(qualifying = manifest.qualifying_count, "rank completed");

    Ok(())
}

fn resolve_snapshot_path(args: &RankArgs) -> Result<PathBuf> {
    if let Some(path) = &args.snapshot_path {
        return Ok(path.clone());
    }

    if args.latest {
        let Some((date, path)) = discover_snapshots(&args.output_dir)?.pop() else {
            bail!(
                "no date-stamped snapshots found in {}; run `bgg-rerank collect` first",
                args.output_dir.display()
            );
        };
        info!(date = %date, "using latest snapshot");
        return Ok(path);
    }

    Ok(default_snapshot_path(
        &args.output_dir,
        Local::now().date_naive(),
    ))
}

fn write_manifest(
    manifest_dir: &Path,
    started_ts: chrono::DateTime<Utc>,
    manifest: &RankRunManifest,
) -> Result<()> {
    ensure_directory(manifest_dir)?;
    let manifest_path = manifest_dir.join(format!(
        "rank_run_{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, manifest)?;
    info!(path = %manifest_path.display(), "wrote rank manifest");
    Ok(())
}
