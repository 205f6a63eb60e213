//! Category-aware regression checks for Criterion benchmark results.
//! Compares a baseline run against a current run and tracks a rolling run
//! history to tell sustained regressions apart from noisy samples.

pub mod classify;
pub mod cli;
pub mod compare;
pub mod config;
pub mod errors;
pub mod estimates;
pub mod gate;
pub mod history;
pub mod history_file;
pub mod report;
pub mod samples;
pub mod synth;
pub mod trend;

pub use crate::classify::{Classification, MetricCategory, classify};
pub use crate::compare::{Comparison, ComparisonResult, Verdict, compare};
pub use crate::config::{AnalysisConfig, ThresholdOverrides, Thresholds};
pub use crate::errors::BenchTrendError;
pub use crate::gate::{GateReport, RegressionGate, TrendGate};
pub use crate::history::{History, HistoryRun};
pub use crate::samples::{Sample, SampleSet};
pub use crate::trend::{TrendClass, TrendRecord, TrendReport, TrendSummary, analyze};
