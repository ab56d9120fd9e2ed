use fio_clat_grid::parser::fio::{
    collect_results, list_result_files, parse_block_size, parse_result_file, parse_run_str,
};
use fio_clat_grid::utils::config::IoMode;
use fio_clat_grid::utils::error::ParseError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn fio_result(bs: serde_json::Value, total: u64, bins: serde_json::Value) -> String {
    json!({
        "fio version": "fio-3.28",
        "timestamp": 1700000000,
        "global options": { "bs": bs, "rw": "randread", "ioengine": "libaio" },
        "jobs": [{
            "jobname": "randread",
            "groupid": 0,
            "read": {
                "io_bytes": 409600,
                "bw": 1200,
                "iops": 300.5,
                "total_ios": total,
                "clat_ns": {
                    "min": 1000,
                    "max": 20000,
                    "mean": 9000.0,
                    "percentile": { "50.000000": 10048, "99.000000": 19968 },
                    "bins": bins
                }
            },
            "write": { "bw": 0, "iops": 0.0, "total_ios": 0 }
        }]
    })
    .to_string()
}

#[test]
fn test_parse_fio_json_plus() {
    let run = parse_run_str(&fio_result(
        json!("4k"),
        100,
        json!({ "10000": 60, "20000": 40 }),
    ))
    .unwrap();

    assert_eq!(run.block_size().unwrap(), 4096);
    assert_eq!(run.jobs.len(), 1);

    let stats = run.jobs[0].stats(IoMode::Read);
    assert_eq!(stats.total_ios, 100);
    assert_eq!(stats.clat_ns.bins.get("10000"), Some(&60));
    assert_eq!(stats.clat_ns.percentile.get("50.000000"), Some(&10048.0));
    assert_eq!(run.jobs[0].stats(IoMode::Write).total_ios, 0);
}

#[test]
fn test_numeric_block_size() {
    let run = parse_run_str(&fio_result(json!(8192), 1, json!({ "500": 1 }))).unwrap();
    assert_eq!(run.block_size().unwrap(), 8192);
}

#[test]
fn test_block_size_from_job_options() {
    let contents = json!({
        "global options": {},
        "jobs": [{
            "jobname": "j",
            "job options": { "bs": "64k" },
            "read": { "total_ios": 0 }
        }]
    })
    .to_string();

    let run = parse_run_str(&contents).unwrap();
    assert_eq!(run.block_size().unwrap(), 65536);
}

#[test]
fn test_missing_block_size() {
    let run = parse_run_str(r#"{"jobs": []}"#).unwrap();
    assert!(matches!(run.block_size(), Err(ParseError::InvalidFormat(_))));
}

#[test]
fn test_zero_block_size() {
    let run = parse_run_str(&fio_result(json!("0"), 0, json!({}))).unwrap();
    assert!(matches!(run.block_size(), Err(ParseError::InvalidBlockSize(_))));
}

#[test]
fn test_block_size_units() {
    assert_eq!(parse_block_size("512").unwrap(), 512);
    assert_eq!(parse_block_size("128K").unwrap(), 131072);
    assert_eq!(parse_block_size("2m").unwrap(), 2 << 20);
    assert_eq!(parse_block_size("1g").unwrap(), 1 << 30);
    assert_eq!(parse_block_size(" 4kb ").unwrap(), 4096);
    assert!(parse_block_size("k").is_err());
}

#[test]
fn test_parse_result_file_missing() {
    let result = parse_result_file("/nonexistent/fio.json");
    assert!(matches!(result, Err(ParseError::Unreadable { .. })));
}

#[test]
fn test_list_result_files_sorted_and_files_only() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.json"), "{}").unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let files = list_result_files(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a.json", "b.json"]);
}

#[test]
fn test_list_result_files_missing_directory() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");

    let result = list_result_files(&missing);
    assert!(matches!(result, Err(ParseError::DirectoryAccess { .. })));
}

#[test]
fn test_collect_results_groups_and_skips() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("4k-client1.json"),
        fio_result(json!("4k"), 1, json!({ "100": 1 })),
    )
    .unwrap();
    fs::write(
        dir.path().join("4k-client2.json"),
        fio_result(json!(4096), 2, json!({ "100": 2 })),
    )
    .unwrap();
    fs::write(
        dir.path().join("8k.json"),
        fio_result(json!("8k"), 1, json!({ "300": 1 })),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not json at all").unwrap();
    fs::write(dir.path().join("nobs.json"), r#"{"jobs": []}"#).unwrap();

    let files = list_result_files(dir.path()).unwrap();
    assert_eq!(files.len(), 5);

    let results = collect_results(&files);
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![4096, 8192]);
    assert_eq!(results[&4096].len(), 2);
    assert_eq!(results[&8192].len(), 1);
}
