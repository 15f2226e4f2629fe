use super::*;

pub fn run(args: CollectArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("collect-{}", utc_compact_string(started_ts));

    let top_n = args.top_n.max(1);
    let batch_size = args.batch_size.max(1);
    let delay = Duration::from_millis(args.batch_delay_ms);
    let snapshot_path = args
        .snapshot_path
        .clone()
        .unwrap_or_else(|| default_snapshot_path(&args.output_dir, Local::now().date_naive()));
    let manifest_dir = args
        .manifest_dir
        .clone()
        .unwrap_or_else(|| args.output_dir.join("manifests"));

    info!(
        run_id = %run_id,
        seed_path = %args.seed_path.display(),
        top_n,
        batch_size,
        "starting collect"
    );

    let seeds = load_seed_records(&args.seed_path)?;
    let selected = select_top(&seeds, top_n);
    let ids = selected.iter().map(|seed| seed.id).collect::<Vec<u64>>();
    let planned_batches = partition_batches(&ids, batch_size).len();

    info!(
        seed_rows = seeds.len(),
        selected = selected.len(),
        batches = planned_batches,
        "selected ranked games"
    );

    if args.dry_run {
        info!(
            snapshot_path = %snapshot_path.display(),
            first_rank = selected.first().map(|seed| seed.rank).unwrap_or_default(),
            last_rank = selected.last().map(|seed| seed.rank).unwrap_or_default(),
            "collect dry-run complete"
        );
        return Ok(());
    }

    let source = HttpThingSource::new(
        &args.endpoint,
        &args.user_agent,
        Duration::from_secs(args.timeout_secs),
    )?;
    let outcome = collect_batches(&source, &ids, batch_size, delay)?;
    let entries = join_with_seeds(&outcome.records, &selected);

    let mut warnings = Vec::<String>::new();
    if !outcome.failed_batches.is_empty() {
        warnings.push(format!(
            "{} of {} batches failed and were skipped",
            outcome.failed_batches.len(),
            outcome.batch_count
        ));
    }

    let written_path = if entries.is_empty() {
        warn!("no records collected; snapshot not written");
        warnings.push("no records collected; snapshot not written".to_string());
        None
    } else {
        write_snapshot(&snapshot_path, &entries)?;
        info!(
            path = %snapshot_path.display(),
            rows = entries.len(),
            "wrote snapshot"
        );
        Some(snapshot_path.display().to_string())
    };

    let manifest = CollectRunManifest {
        manifest_version: 1,
        run_id,
        status: if written_path.is_some() {
            "completed"
        } else {
            "empty"
        }
        .to_string(),
        started_at,
        finished_at: now_utc_string(),
        seed_path: args.seed_path.display().to_string(),
        seed_sha256: sha256_file(&args.seed_path)?,
        endpoint: args.endpoint.clone(),
        top_n,
        batch_size,
        batch_delay_ms: args.batch_delay_ms,
        selected_count: selected.len(),
        batch_count: outcome.batch_count,
        failed_batches: outcome.failed_batches,
        collected_count: outcome.records.len(),
        snapshot_row_count: entries.len(),
        snapshot_path: written_path,
        warnings,
    };

    ensure_directory(&manifest_dir)?;
    let manifest_path = manifest_dir.join(format!(
        "collect_run_{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        path = %manifest_path.display(),
        collected = manifest.collected_count,
        failed_batches = manifest.failed_batches.len(),
        "collect completed"
    );

    Ok(())
}

pub fn default_snapshot_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(snapshot_file_name(date))
}
