use fio_clat_grid::commands::{
    build_grid, execute_grid, populate, validate_args, validate_grid_file, GridArgs,
};
use fio_clat_grid::output::read_grid_report;
use fio_clat_grid::parser::{parse_run_str, ResultSet};
use fio_clat_grid::utils::config::{GridConfig, IoMode, GRID_REPORT_FILENAME};
use fio_clat_grid::utils::error::GridError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fio_result(bs: &str, total: u64, bins: serde_json::Value) -> String {
    json!({
        "fio version": "fio-3.28",
        "global options": { "bs": bs },
        "jobs": [{
            "jobname": "randread",
            "read": {
                "bw": 2000,
                "iops": 500.0,
                "total_ios": total,
                "clat_ns": {
                    "percentile": { "50.000000": 10000, "99.000000": 20000 },
                    "bins": bins
                }
            },
            "write": { "bw": 0, "iops": 0.0, "total_ios": 0 }
        }]
    })
    .to_string()
}

fn write_inputs(dir: &Path) {
    fs::write(
        dir.join("4k-client1.json"),
        fio_result("4k", 100, json!({ "10000": 60, "20000": 40 })),
    )
    .unwrap();
    fs::write(
        dir.join("4k-client2.json"),
        fio_result("4k", 50, json!({ "10000": 50 })),
    )
    .unwrap();
    fs::write(
        dir.join("16k.json"),
        fio_result("16k", 10, json!({ "5000": 5, "40000": 5 })),
    )
    .unwrap();
    fs::write(dir.join("README"), "fio runs for nvme0").unwrap();
}

fn args_for(input: &Path, output: &Path) -> GridArgs {
    GridArgs {
        input_dirs: vec![input.to_path_buf()],
        output_dir: output.to_path_buf(),
        config: GridConfig {
            rows: 40,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn results_from(runs: &[(u64, String)]) -> ResultSet {
    let mut results = ResultSet::new();
    for (bs, contents) in runs {
        results
            .entry(*bs)
            .or_default()
            .push(parse_run_str(contents).unwrap());
    }
    results
}

#[test]
fn test_execute_grid_end_to_end() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_dir = output.path().join("run1");
    write_inputs(input.path());

    let report = execute_grid(args_for(input.path(), &output_dir)).unwrap();

    assert_eq!(report.cells.len(), 40);
    assert_eq!(report.bounds.min_block_exp, 12);
    assert_eq!(report.bounds.max_block_exp, 14);
    assert_eq!(
        report
            .block_sizes
            .iter()
            .map(|b| (b.block_size, b.samples, b.total_ios))
            .collect::<Vec<_>>(),
        vec![(4096, 2, 150), (16384, 1, 10)]
    );

    for name in [
        GRID_REPORT_FILENAME,
        "blob.svg",
        "read-bandwidth.dat",
        "read-iops-latency.dat",
        "read-clat.dat",
    ] {
        assert!(output_dir.join(name).exists(), "missing {}", name);
    }

    let written = read_grid_report(output_dir.join(GRID_REPORT_FILENAME)).unwrap();
    assert_eq!(written, report);

    validate_grid_file(output_dir.join(GRID_REPORT_FILENAME)).unwrap();
}

#[test]
fn test_execute_grid_refuses_dirty_output() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());

    execute_grid(args_for(input.path(), output.path())).unwrap();
    assert!(execute_grid(args_for(input.path(), output.path())).is_err());

    let mut args = args_for(input.path(), output.path());
    args.force = true;
    execute_grid(args).unwrap();

    // Tables are rewritten, not appended to
    let bandwidth = fs::read_to_string(output.path().join("read-bandwidth.dat")).unwrap();
    assert_eq!(bandwidth.lines().count(), 3);
}

#[test]
fn test_execute_grid_aborts_on_sum_mismatch() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    fs::write(
        input.path().join("8k.json"),
        fio_result("8k", 100, json!({ "10000": 50, "20000": 49 })),
    )
    .unwrap();

    let err = execute_grid(args_for(input.path(), output.path())).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GridError>(),
        Some(&GridError::HistogramSumMismatch {
            block_size: 8192,
            sum: 99,
            expected: 100,
        })
    );
    assert!(!output.path().join(GRID_REPORT_FILENAME).exists());
}

#[test]
fn test_execute_grid_missing_input_dir() {
    let output = TempDir::new().unwrap();
    let missing = output.path().join("nope");

    assert!(execute_grid(args_for(&missing, &output.path().join("out"))).is_err());
}

#[test]
fn test_execute_grid_skipped_block_size_still_tabulated() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());

    let mut args = args_for(input.path(), output.path());
    args.config.skip_block_sizes.insert(16384);
    let report = execute_grid(args).unwrap();

    assert_eq!(report.block_sizes.len(), 1);
    assert_eq!(report.bounds.max_block_exp, 12);

    let bandwidth = fs::read_to_string(output.path().join("read-bandwidth.dat")).unwrap();
    assert!(bandwidth.lines().any(|l| l.trim_start().starts_with("16384")));
}

#[test]
fn test_populate_skips_jobs_without_ios() {
    let results = results_from(&[
        (4096, fio_result("4k", 2, json!({ "1000": 2 }))),
        (8192, fio_result("8k", 0, json!({}))),
    ]);

    let series = populate(&results, &GridConfig::default(), None).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.total_ios(), 2);
}

#[test]
fn test_populate_checks_bins_of_zero_total_job() {
    let results = results_from(&[
        (4096, fio_result("4k", 2, json!({ "1000": 2 }))),
        (4096, fio_result("4k", 0, json!({ "5000": 7 }))),
    ]);

    let err = populate(&results, &GridConfig::default(), None).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GridError>(),
        Some(&GridError::HistogramSumMismatch {
            block_size: 4096,
            sum: 7,
            expected: 0,
        })
    );
}

#[test]
fn test_populate_write_mode_reads_write_stats() {
    let results = results_from(&[(4096, fio_result("4k", 2, json!({ "1000": 2 })))]);
    let config = GridConfig {
        mode: IoMode::Write,
        ..Default::default()
    };

    // The only job has no writes
    let err = populate(&results, &config, None).unwrap_err();
    assert_eq!(err.downcast_ref::<GridError>(), Some(&GridError::NoSeries));
}

#[test]
fn test_build_grid_conserves_every_column() {
    let results = results_from(&[
        (512, fio_result("512", 3, json!({ "800": 1, "2500": 2 }))),
        (4096, fio_result("4k", 100, json!({ "10000": 60, "20000": 40 }))),
        (4096, fio_result("4k", 50, json!({ "10000": 50 }))),
    ]);

    let series = populate(&results, &GridConfig::default(), None).unwrap();
    let grid = build_grid(&series, 100).unwrap();

    assert_eq!(grid.cols(), 4);
    for col in (0..grid.cols()).filter(|&c| grid.is_column_populated(c)) {
        assert!((grid.column_mass(col) - 1.0).abs() < 1e-3);
    }
    assert!(!grid.is_column_populated(1));
}

#[test]
fn test_validate_args() {
    let mut args = GridArgs::default();
    assert!(validate_args(&args).is_err());

    args.input_dirs.push("results".into());
    assert!(validate_args(&args).is_ok());

    args.filename = "out/blob.svg".to_string();
    assert!(validate_args(&args).is_err());

    args.filename = GRID_REPORT_FILENAME.to_string();
    assert!(validate_args(&args).is_err());

    args.filename = "heat.svg".to_string();
    args.config.rows = 0;
    assert!(validate_args(&args).is_err());

    args.config.rows = 10;
    args.heatmap.width = 0;
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_grid_file_detects_tampering() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    execute_grid(args_for(input.path(), output.path())).unwrap();

    let path = output.path().join(GRID_REPORT_FILENAME);
    let mut report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    report["cells"][0][0] = json!(5.0);
    fs::write(&path, report.to_string()).unwrap();

    assert!(validate_grid_file(path).is_err());
}
