use benchtrend::{
    History, SampleSet, Thresholds, analyze, compare,
    report::{ComparisonDocument, render_comparison, render_trends, trend_json},
};
use chrono::{TimeZone, Utc};

fn set(pairs: &[(&str, f64)]) -> SampleSet {
    pairs.iter().copied().collect()
}

#[test]
fn test_comparison_text_groups_regressions_by_category() {
    let comparison = compare(
        &set(&[("search/p50", 1000.0), ("search/p95", 1000.0), ("heap", 2000.0)]),
        &set(&[("search/p50", 1150.0), ("search/p95", 1500.0), ("heap", 1000.0)]),
        &Thresholds::default(),
    );
    let text = render_comparison(&comparison, &Thresholds::default());
    assert!(text.contains("BENCHMARK REGRESSION CHECK"));
    assert!(text.contains("[LATENCY] (threshold: 10%)"));
    let p95 = text.find("search/p95").unwrap();
    let p50 = text.find("search/p50").unwrap();
    assert!(p95 < p50, "larger regression listed first");
    assert!(text.contains("Change:   +15.0% (>10%)"));
    assert!(text.contains("IMPROVEMENTS:"));
    assert!(text.contains("Baseline: 2.00µs"));
    assert!(text.contains("Regressions:  2"));
    assert!(text.contains("duration: ±20%"));
}

#[test]
fn test_clean_comparison_has_only_summary() {
    let comparison = compare(
        &set(&[("x", 10.0)]),
        &set(&[("x", 10.0)]),
        &Thresholds::default(),
    );
    let text = render_comparison(&comparison, &Thresholds::default());
    assert!(!text.contains("REGRESSIONS:"));
    assert!(!text.contains("IMPROVEMENTS:"));
    assert!(text.contains("Unchanged:    1"));
}

#[test]
fn test_comparison_document_json() {
    let thresholds = Thresholds::default();
    let comparison = compare(
        &set(&[("search/p50", 1000.0), ("x", 1.0)]),
        &set(&[("search/p50", 1150.0), ("x", 1.0)]),
        &thresholds,
    );
    let at = Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap();
    let json = ComparisonDocument::new(&comparison, &thresholds, Some("abc"), at)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["has_regressions"], true);
    assert_eq!(value["unchanged_count"], 1);
    assert_eq!(value["run_id"], "abc");
    assert_eq!(value["thresholds"]["duration"], 20.0);
    assert_eq!(value["regressions"][0]["name"], "search/p50");
    assert!(value["improvements"].as_array().unwrap().is_empty());
}

#[test]
fn test_trend_text_for_insufficient_data() {
    let text = render_trends(&analyze(&History::new(), 5, &Thresholds::default()));
    assert!(text.contains("Insufficient data for trend analysis (runs: 0)"));
}

#[test]
fn test_trend_text_lists_each_bucket() {
    let mut history = History::new();
    let series = [
        ("index/ingest", [100.0, 110.0, 121.0, 133.0, 146.0]),
        ("search/p50", [100.0, 140.0, 95.0, 150.0, 90.0]),
        ("heap", [100.0, 90.0, 80.0, 70.0, 60.0]),
        ("flat", [5.0, 5.0, 5.0, 5.0, 5.0]),
    ];
    for idx in 0..5 {
        history.append(
            series.iter().map(|(name, values)| (*name, values[idx])).collect(),
            None,
        );
    }
    let report = analyze(&history, 5, &Thresholds::default());
    let text = render_trends(&report);
    assert!(text.contains("Analyzed last 5 runs"));
    assert!(text.contains("SUSTAINED REGRESSIONS (action required):"));
    assert!(text.contains("index/ingest [throughput]"));
    assert!(text.contains("Total change: +46.0%"));
    assert!(text.contains("VOLATILE (high variance):"));
    assert!(text.contains("search/p50 [latency]"));
    assert!(text.contains("Stable metrics: 1"));

    let json: serde_json::Value = serde_json::from_str(&trend_json(&report).unwrap()).unwrap();
    assert_eq!(json["sustained_regressions"][0]["regression_count"], 4);
}
