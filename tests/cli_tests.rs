use std::{fs, path::Path};

use assert_cmd::Command;
use benchtrend::{History, history_file::load_history};
use serde_json::Value;

fn write_estimate(target: &Path, name: &str, baseline: &str, mean: f64) {
    let (group, bench) = name.split_once('/').unwrap();
    let dir = target
        .join("criterion")
        .join(group)
        .join(bench)
        .join(baseline);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("estimates.json"),
        format!(r#"{{"mean":{{"point_estimate":{mean}}}}}"#),
    )
    .unwrap();
}

fn benchtrend() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_benchtrend"));
    cmd.env_remove("BENCHTREND_HISTORY_FILE");
    cmd
}

fn write_history(path: &Path, series: &[f64]) {
    let mut history = History::new();
    for value in series {
        history.append([("index/ingest", *value)].into_iter().collect(), None);
    }
    fs::write(path, serde_json::to_vec_pretty(&history).unwrap()).unwrap();
}

#[test]
fn test_cli_exits_with_success_on_help() {
    benchtrend().arg("--help").assert().success();
}

#[test]
fn test_cli_passes_without_criterion_data() {
    let target = tempfile::tempdir().unwrap();
    let assert = benchtrend()
        .env_remove("RUST_LOG")
        .args(["--target-dir", target.path().to_str().unwrap()])
        .assert()
        .success();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("--save-baseline main"));
}

#[test]
fn test_cli_fails_on_regression() {
    let target = tempfile::tempdir().unwrap();
    write_estimate(target.path(), "search/p50", "main", 1000.0);
    write_estimate(target.path(), "search/p50", "pr", 1150.0);
    let assert = benchtrend()
        .args(["--target-dir", target.path().to_str().unwrap()])
        .assert()
        .code(1);
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("1 regression(s): 1 latency"));
}

#[test]
fn test_cli_passes_within_category_tolerance() {
    let target = tempfile::tempdir().unwrap();
    write_estimate(target.path(), "suite/total", "main", 100_000.0);
    write_estimate(target.path(), "suite/total", "pr", 115_000.0);
    benchtrend()
        .args(["--target-dir", target.path().to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn test_cli_global_threshold_overrides_categories() {
    let target = tempfile::tempdir().unwrap();
    write_estimate(target.path(), "suite/total", "main", 100_000.0);
    write_estimate(target.path(), "suite/total", "pr", 115_000.0);
    benchtrend()
        .args([
            "--target-dir",
            target.path().to_str().unwrap(),
            "--threshold",
            "5",
        ])
        .assert()
        .code(1);
}

#[test]
fn test_cli_json_output() {
    let target = tempfile::tempdir().unwrap();
    write_estimate(target.path(), "search/p50", "base", 1000.0);
    write_estimate(target.path(), "search/p50", "head", 1010.0);
    let assert = benchtrend()
        .args([
            "--target-dir",
            target.path().to_str().unwrap(),
            "--baseline",
            "base",
            "--current",
            "head",
            "--json",
            "--run-id",
            "sha1",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["has_regressions"], false);
    assert_eq!(value["unchanged_count"], 1);
    assert_eq!(value["run_id"], "sha1");
}

#[test]
fn test_cli_saves_history_with_limit() {
    let target = tempfile::tempdir().unwrap();
    write_estimate(target.path(), "x/y", "main", 10.0);
    write_estimate(target.path(), "x/y", "pr", 10.0);
    let history_path = target.path().join("perf_history.json");
    for run in 0..3 {
        benchtrend()
            .args([
                "--target-dir",
                target.path().to_str().unwrap(),
                "--save-history",
                "--history-file",
                history_path.to_str().unwrap(),
                "--history-limit",
                "2",
                "--run-id",
                &format!("run-{run}"),
            ])
            .assert()
            .success();
    }
    let history = load_history(&history_path);
    let ids: Vec<&str> = history.runs.iter().map(|r| r.run_id.as_str()).collect();
    assert_eq!(ids, vec!["run-1", "run-2"]);
    assert_eq!(history.runs[1].benchmarks.get("x/y"), Some(10.0));
}

#[test]
fn test_cli_trend_analysis_requires_history_file() {
    benchtrend().arg("--analyze-trends").assert().code(2);
}

#[test]
fn test_cli_trend_analysis_fails_on_sustained_regression() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    write_history(&path, &[100.0, 110.0, 121.0, 133.0, 146.0]);
    let assert = benchtrend()
        .args(["--analyze-trends", "--history-file", path.to_str().unwrap()])
        .assert()
        .code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("SUSTAINED REGRESSIONS"));
}

#[test]
fn test_cli_trend_analysis_reads_history_file_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    write_history(&path, &[100.0, 101.0, 100.0]);
    let assert = Command::new(env!("CARGO_BIN_EXE_benchtrend"))
        .env("BENCHTREND_HISTORY_FILE", &path)
        .args(["--analyze-trends", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["status"], "analyzed");
    assert_eq!(value["stable"][0]["name"], "index/ingest");
}

#[test]
fn test_cli_trend_analysis_with_corrupt_history_passes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, "not json").unwrap();
    let assert = benchtrend()
        .args(["--analyze-trends", "--history-file", path.to_str().unwrap()])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Insufficient data"));
}

#[test]
fn test_cli_rejects_negative_threshold() {
    let target = tempfile::tempdir().unwrap();
    benchtrend()
        .args([
            "--target-dir",
            target.path().to_str().unwrap(),
            "--memory-threshold=-3",
        ])
        .assert()
        .code(2);
}
