use std::{io::Write, path::PathBuf};

use chrono::Utc;
use clap::Parser;
use tracing::warn;

use crate::{
    BenchTrendError,
    compare::compare,
    config::{AnalysisConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_TREND_WINDOW, ThresholdOverrides},
    estimates::{find_criterion_dir, load_estimates},
    gate::{GateReport, RegressionGate, TrendGate},
    history_file::{history_file_path, load_history, save_history},
    report::{ComparisonDocument, render_comparison, render_trends, trend_json},
    trend::analyze,
};

pub const EXIT_PASS: i32 = 0;
pub const EXIT_FAIL: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

const THRESHOLD_HELP: &str = "\
Metric thresholds (configurable):
  --latency-threshold     Search/query latency (default: 10%)
  --duration-threshold    Test/task duration (default: 20%)
  --memory-threshold      Memory usage (default: 15%)
  --throughput-threshold  Indexing throughput (default: 10%)
  --other-threshold       Unclassified metrics (default: 10%)";

#[derive(Debug, Parser)]
#[command(
    name = "benchtrend",
    version,
    about = "Check Criterion benchmarks for regressions with metric-specific thresholds",
    after_help = THRESHOLD_HELP
)]
pub struct Cli {
    /// Override all thresholds with a single value
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Latency regression threshold in percent
    #[arg(long)]
    pub latency_threshold: Option<f64>,
    /// Duration regression threshold in percent
    #[arg(long)]
    pub duration_threshold: Option<f64>,
    /// Memory regression threshold in percent
    #[arg(long)]
    pub memory_threshold: Option<f64>,
    /// Throughput regression threshold in percent
    #[arg(long)]
    pub throughput_threshold: Option<f64>,
    /// Threshold for metrics no category matches
    #[arg(long)]
    pub other_threshold: Option<f64>,
    /// Baseline benchmark name
    #[arg(long, default_value = "main")]
    pub baseline: String,
    /// Current benchmark name
    #[arg(long, default_value = "pr")]
    pub current: String,
    /// Cargo target directory
    #[arg(long, default_value = "target")]
    pub target_dir: PathBuf,
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
    /// Also fail on any slowdown, regardless of threshold
    #[arg(long)]
    pub strict: bool,
    /// JSON file storing benchmark history (or BENCHTREND_HISTORY_FILE)
    #[arg(long)]
    pub history_file: Option<PathBuf>,
    /// Save current results to the history file
    #[arg(long)]
    pub save_history: bool,
    /// Analyze historical trends for sustained regressions
    #[arg(long)]
    pub analyze_trends: bool,
    /// Maximum number of historical entries to keep
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,
    /// Number of recent runs to analyze for trends
    #[arg(long, default_value_t = DEFAULT_TREND_WINDOW)]
    pub trend_window: usize,
    /// Identifier for this run (commit SHA, PR number, ...)
    #[arg(long)]
    pub run_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Pass => EXIT_PASS,
            Outcome::Fail => EXIT_FAIL,
        }
    }
}

impl Cli {
    pub fn threshold_overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            global: self.threshold,
            latency: self.latency_threshold,
            duration: self.duration_threshold,
            memory: self.memory_threshold,
            throughput: self.throughput_threshold,
            other: self.other_threshold,
        }
    }

    pub fn analysis_config(&self) -> Result<AnalysisConfig, BenchTrendError> {
        AnalysisConfig::new(self.trend_window, self.history_limit)
    }
}

/// Runs one invocation. Reports go to `out`, status lines to `err`.
pub fn run<W: Write, E: Write>(
    cli: &Cli,
    out: &mut W,
    err: &mut E,
) -> Result<Outcome, BenchTrendError> {
    let thresholds = cli.threshold_overrides().resolve()?;
    let config = cli.analysis_config()?;
    let history_path = history_file_path(cli.history_file.as_deref());

    if cli.analyze_trends {
        let path = history_path.ok_or_else(|| {
            BenchTrendError::invalid_input("--history-file required for trend analysis")
        })?;
        let history = load_history(&path);
        let report = analyze(&history, config.window, &thresholds);
        if cli.json {
            emit(out, &trend_json(&report)?)?;
        } else {
            emit(out, &render_trends(&report))?;
        }
        let gate = TrendGate.evaluate(&report);
        return finish(
            err,
            &gate,
            &format!(
                "FAIL: {} sustained regression(s) detected",
                gate.reasons.len()
            ),
            "PASS: No sustained regressions in trend analysis",
        );
    }

    let Some(criterion_dir) = find_criterion_dir(&cli.target_dir) else {
        warn!(target_dir = %cli.target_dir.display(), "no criterion benchmark data found");
        warn!("run benchmarks first: cargo bench --bench <name> -- --save-baseline main");
        return Ok(Outcome::Pass);
    };
    let baseline = load_estimates(&criterion_dir, &cli.baseline)?;
    if baseline.is_empty() {
        warn!(baseline = %cli.baseline, "no baseline benchmark data found");
        return Ok(Outcome::Pass);
    }
    let current = load_estimates(&criterion_dir, &cli.current)?;
    if current.is_empty() {
        warn!(current = %cli.current, "no current benchmark data found");
        return Ok(Outcome::Pass);
    }

    if cli.save_history {
        match &history_path {
            Some(path) => {
                let mut history = load_history(path);
                history.append(current.clone(), cli.run_id.clone());
                save_history(path, &mut history, config.history_limit)?;
                writeln!(err, "Saved benchmark results to {}", path.display())
                    .map_err(|e| BenchTrendError::io(e.to_string()))?;
            }
            None => warn!("--save-history ignored without --history-file"),
        }
    }

    let comparison = compare(&baseline, &current, &thresholds);
    if cli.json {
        let document =
            ComparisonDocument::new(&comparison, &thresholds, cli.run_id.as_deref(), Utc::now());
        emit(out, &document.to_json()?)?;
    } else {
        emit(out, &render_comparison(&comparison, &thresholds))?;
    }

    let gate = RegressionGate::new(cli.strict).evaluate(&comparison);
    finish(
        err,
        &gate,
        "FAIL: regressions detected",
        "PASS: No significant regressions detected",
    )
}

fn finish<E: Write>(
    err: &mut E,
    gate: &GateReport,
    fail_headline: &str,
    pass_line: &str,
) -> Result<Outcome, BenchTrendError> {
    let io = |e: std::io::Error| BenchTrendError::io(e.to_string());
    if gate.passed {
        writeln!(err, "{pass_line}").map_err(io)?;
        return Ok(Outcome::Pass);
    }
    writeln!(err, "{fail_headline}").map_err(io)?;
    for reason in &gate.reasons {
        writeln!(err, "  {reason}").map_err(io)?;
    }
    Ok(Outcome::Fail)
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<(), BenchTrendError> {
    writeln!(out, "{text}").map_err(|e| BenchTrendError::io(e.to_string()))
}
