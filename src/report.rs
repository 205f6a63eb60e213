//! Human-readable and JSON renderings of comparison and trend results.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::Write as _,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    BenchTrendError,
    classify::MetricCategory,
    compare::{Comparison, ComparisonResult},
    config::Thresholds,
    trend::{TrendRecord, TrendReport},
};

const RULE_WIDE: usize = 60;
const RULE_NARROW: usize = 40;

/// Formats a nanosecond quantity with the largest unit that keeps it >= 1.
pub fn format_ns(ns: f64) -> String {
    if ns >= 1_000_000_000.0 {
        format!("{:.2}s", ns / 1_000_000_000.0)
    } else if ns >= 1_000_000.0 {
        format!("{:.2}ms", ns / 1_000_000.0)
    } else if ns >= 1_000.0 {
        format!("{:.2}µs", ns / 1_000.0)
    } else {
        format!("{ns:.0}ns")
    }
}

#[derive(Debug, Serialize)]
pub struct ComparisonDocument<'a> {
    pub thresholds: &'a Thresholds,
    pub regressions: &'a [ComparisonResult],
    pub improvements: &'a [ComparisonResult],
    pub unchanged_count: usize,
    pub has_regressions: bool,
    pub timestamp: DateTime<Utc>,
    pub run_id: Option<&'a str>,
}

impl<'a> ComparisonDocument<'a> {
    pub fn new(
        comparison: &'a Comparison,
        thresholds: &'a Thresholds,
        run_id: Option<&'a str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            thresholds,
            regressions: &comparison.regressed,
            improvements: &comparison.improved,
            unchanged_count: comparison.unchanged.len(),
            has_regressions: comparison.has_regressions(),
            timestamp,
            run_id,
        }
    }

    pub fn to_json(&self) -> Result<String, BenchTrendError> {
        serde_json::to_string_pretty(self).map_err(|e| BenchTrendError::invalid_input(e.to_string()))
    }
}

pub fn trend_json(report: &TrendReport) -> Result<String, BenchTrendError> {
    serde_json::to_string_pretty(report).map_err(|e| BenchTrendError::invalid_input(e.to_string()))
}

pub fn render_comparison(comparison: &Comparison, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    banner(&mut out, "BENCHMARK REGRESSION CHECK");

    if !comparison.regressed.is_empty() {
        section(&mut out, "REGRESSIONS:");
        for (category, mut items) in by_category(&comparison.regressed) {
            items.sort_by(|a, b| descending(a.diff_pct, b.diff_pct));
            category_heading(&mut out, category, thresholds);
            for r in items {
                result_lines(&mut out, r);
                let _ = writeln!(
                    out,
                    "      Change:   +{:.1}% (>{}%)",
                    r.diff_pct, r.threshold
                );
            }
        }
        out.push('\n');
    }

    if !comparison.improved.is_empty() {
        section(&mut out, "IMPROVEMENTS:");
        for (category, mut items) in by_category(&comparison.improved) {
            items.sort_by(|a, b| ascending(a.diff_pct, b.diff_pct));
            category_heading(&mut out, category, thresholds);
            for r in items {
                result_lines(&mut out, r);
                let _ = writeln!(out, "      Change:   {:.1}%", r.diff_pct);
            }
        }
        out.push('\n');
    }

    section(&mut out, "SUMMARY:");
    let _ = writeln!(out, "  Regressions:  {}", comparison.regressed.len());
    let _ = writeln!(out, "  Improvements: {}", comparison.improved.len());
    let _ = writeln!(out, "  Unchanged:    {}", comparison.unchanged.len());
    out.push('\n');
    out.push_str("  Thresholds by metric type:\n");
    for (category, pct) in thresholds.entries() {
        let _ = writeln!(out, "    {category}: ±{pct}%");
    }
    out.push('\n');
    out
}

pub fn render_trends(report: &TrendReport) -> String {
    let mut out = String::new();
    banner(&mut out, "TREND ANALYSIS");

    let summary = match report {
        TrendReport::InsufficientData { runs_available } => {
            let _ = writeln!(
                out,
                "Insufficient data for trend analysis (runs: {runs_available})"
            );
            out.push_str("   Need at least 2 historical runs.\n");
            return out;
        }
        TrendReport::Analyzed(summary) => summary,
    };

    let _ = writeln!(out, "Analyzed last {} runs\n", summary.window_size);

    if !summary.sustained_regressions.is_empty() {
        section(&mut out, "SUSTAINED REGRESSIONS (action required):");
        for t in sorted(&summary.sustained_regressions, |a, b| {
            descending(a.total_change_pct, b.total_change_pct)
        }) {
            trend_heading(&mut out, t);
            let _ = writeln!(out, "    Total change: +{:.1}%", t.total_change_pct);
            let _ = writeln!(
                out,
                "    Mean: {}, StdDev: {}",
                format_ns(t.mean),
                format_ns(t.std_dev)
            );
        }
        out.push('\n');
    }

    if !summary.improving.is_empty() {
        section(&mut out, "CONSISTENTLY IMPROVING:");
        for t in sorted(&summary.improving, |a, b| {
            ascending(a.total_change_pct, b.total_change_pct)
        }) {
            trend_heading(&mut out, t);
            let _ = writeln!(out, "    Total change: {:.1}%", t.total_change_pct);
        }
        out.push('\n');
    }

    if !summary.volatile.is_empty() {
        section(&mut out, "VOLATILE (high variance):");
        for t in sorted(&summary.volatile, |a, b| descending(a.cv_pct, b.cv_pct)) {
            trend_heading(&mut out, t);
            let _ = writeln!(
                out,
                "    CV: {:.1}% (may indicate flaky measurement)",
                t.cv_pct
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Stable metrics: {}\n", summary.stable.len());
    out
}

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDE);
    let _ = write!(out, "\n{rule}\n{title}\n{rule}\n\n");
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}\n{}", "-".repeat(RULE_NARROW));
}

fn category_heading(out: &mut String, category: MetricCategory, thresholds: &Thresholds) {
    let _ = writeln!(
        out,
        "\n  [{}] (threshold: {}%)",
        category.as_str().to_uppercase(),
        thresholds.for_category(category)
    );
}

fn result_lines(out: &mut String, r: &ComparisonResult) {
    let _ = writeln!(out, "    {}", r.name);
    let _ = writeln!(out, "      Baseline: {}", format_ns(r.baseline_value));
    let _ = writeln!(out, "      Current:  {}", format_ns(r.current_value));
}

fn trend_heading(out: &mut String, t: &TrendRecord) {
    let _ = writeln!(out, "  {} [{}]", t.name, t.category);
}

fn by_category(results: &[ComparisonResult]) -> BTreeMap<MetricCategory, Vec<&ComparisonResult>> {
    let mut groups: BTreeMap<MetricCategory, Vec<&ComparisonResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.category).or_default().push(result);
    }
    groups
}

fn sorted<F>(records: &[TrendRecord], order: F) -> Vec<&TrendRecord>
where
    F: Fn(&TrendRecord, &TrendRecord) -> Ordering,
{
    let mut refs: Vec<&TrendRecord> = records.iter().collect();
    refs.sort_by(|a, b| order(*a, *b));
    refs
}

fn ascending(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
