//! Grid command implementation.
//!
//! The grid command:
//! 1. Prepares the output directory
//! 2. Scans the input directories for fio results
//! 3. Ingests every job's latency histogram (and dumps the raw tables)
//! 4. Normalises the histograms into densities
//! 5. Resamples the densities onto the grid
//! 6. Writes the grid report and heatmap

use super::models::GridArgs;
use crate::aggregator::{normalize, resample, AccumulatedSeries, Admission, ClatIngest, Grid};
use crate::heatmap::{generate_heatmap, generate_text_summary};
use crate::output::{prepare_output_dir, write_grid_report, write_svg, TableWriter};
use crate::parser::{collect_results, list_result_files, to_report, GridReport, ResultSet};
use crate::utils::config::{GridConfig, GRID_REPORT_FILENAME};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the grid command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The report that was written to the output directory
///
/// # Errors
/// * Output directory problems
/// * Unreadable input directories
/// * Any data-integrity fault in the histograms (the whole run aborts)
/// * File write errors
pub fn execute_grid(args: GridArgs) -> Result<GridReport> {
    let start_time = Instant::now();

    info!("Step 1/6: Preparing output directory {}...", args.output_dir.display());
    prepare_output_dir(&args.output_dir, args.force)
        .context("Failed to prepare output directory")?;

    info!("Step 2/6: Scanning input directories...");
    let mut results = ResultSet::new();
    for input_dir in &args.input_dirs {
        info!("Scanning for fio data in {}", input_dir.display());
        let files = list_result_files(input_dir)?;
        for (block_size, runs) in collect_results(&files) {
            results.entry(block_size).or_default().extend(runs);
        }
    }

    info!("Step 3/6: Ingesting latency histograms...");
    let tables = TableWriter::new(&args.output_dir, args.config.mode);
    let series = populate(&results, &args.config, Some(&tables))?;

    info!("Step 4/6: Normalising densities...");
    info!("Step 5/6: Fitting to a {}-row grid...", args.config.rows);
    let grid = build_grid(&series, args.config.rows)?;

    info!("Step 6/6: Writing output files...");
    let report = to_report(&grid, &series, &args.config);
    write_grid_report(&report, args.output_dir.join(GRID_REPORT_FILENAME))
        .context("Failed to write grid report")?;

    let heatmap = args
        .heatmap
        .clone()
        .with_axis(args.config.time_unit, args.config.log_scale);
    let svg = generate_heatmap(&grid, &heatmap).context("Failed to generate heatmap")?;
    write_svg(&svg, args.output_dir.join(&args.filename)).context("Failed to write heatmap SVG")?;

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("{}", generate_text_summary(&report));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Grid completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Feed every job of every parsed result into a fresh accumulator
///
/// Raw tables are written for every job, including block sizes that the
/// configuration excludes from the grid. Jobs without any completion in the
/// selected direction, and an empty histogram, are skipped.
///
/// # Errors
/// Any `GridError` from ingestion, e.g. a histogram whose bins do not sum to
/// the declared total. The error names the offending block size.
pub fn populate(
    results: &ResultSet,
    config: &GridConfig,
    tables: Option<&TableWriter>,
) -> Result<AccumulatedSeries> {
    let mut ingest = ClatIngest::new(config.into());

    for (&block_size, runs) in results {
        for job in runs.iter().flat_map(|run| run.jobs.iter()) {
            if let Some(tables) = tables {
                tables
                    .append_job(block_size, job)
                    .context("Failed to append result tables")?;
            }

            let stats = job.stats(config.mode);
            // Bins without a declared total still go through the sum check
            if stats.total_ios == 0 && stats.clat_ns.bins.values().all(|&count| count == 0) {
                warn!(
                    "I/O size {}, job {}: no {} I/Os, skipping",
                    block_size, job.jobname, config.mode
                );
                continue;
            }

            match ingest.add_series(block_size, stats.total_ios, &stats.clat_ns.bins)? {
                Admission::Accepted => info!(
                    "I/O size {:8}, job {}: {} samples",
                    block_size, config.mode, stats.total_ios
                ),
                skipped => debug!("I/O size {:8}: {:?}", block_size, skipped),
            }
        }
    }

    let series = ingest.finish()?;

    let max_latency = series.bounds().max_latency;
    info!(
        "Aggregated data for {} I/Os, max latency {} {}",
        series.total_ios(),
        if config.log_scale {
            10f64.powf(max_latency)
        } else {
            max_latency
        },
        config.time_unit
    );

    Ok(series)
}

/// Normalise accumulated series and resample them onto the grid
pub fn build_grid(series: &AccumulatedSeries, rows: usize) -> Result<Grid> {
    let field = normalize(series)?;
    let grid = resample(&field, rows, series.bounds())?;
    Ok(grid)
}

/// Validate grid arguments
///
/// **Public** - can be called before execute_grid for early validation
pub fn validate_args(args: &GridArgs) -> Result<()> {
    if args.input_dirs.is_empty() {
        anyhow::bail!("At least one input directory is required");
    }

    args.config.validate()?;

    if args.filename.is_empty() {
        anyhow::bail!("Heatmap file name cannot be empty");
    }

    if args.filename.contains('/') || args.filename.contains('\\') {
        anyhow::bail!("Heatmap file name must not contain path separators");
    }

    if args.filename == GRID_REPORT_FILENAME {
        anyhow::bail!("Heatmap file name collides with {}", GRID_REPORT_FILENAME);
    }

    if args.heatmap.width == 0 || args.heatmap.height == 0 {
        anyhow::bail!("Heatmap dimensions must be greater than 0");
    }

    Ok(())
}
