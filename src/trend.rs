//! Windowed trend analysis over the run history.
//!
//! Each metric's values across the newest runs form a series. A series is
//! classified, in this order:
//!
//! 1. **volatile** when its coefficient of variation exceeds
//!    [`VOLATILE_CV_PCT`];
//! 2. **sustained regression** when every step worsened by at least
//!    5% ([`WORSENING_STEP`]) and the net change exceeds the category threshold;
//! 3. **improving** for the mirror image;
//! 4. **stable** otherwise.
//!
//! A metric can look both noisy and trending at once, so the order above is
//! part of the contract.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{MetricCategory, classify},
    config::Thresholds,
    history::{History, HistoryRun},
};

/// Step-over-step ratio above which a step counts as a worsening.
pub const WORSENING_STEP: f64 = 1.05;
/// Step-over-step ratio below which a step counts as an improvement.
pub const IMPROVING_STEP: f64 = 0.95;
/// CV (percent) above which a series is reported as volatile.
pub const VOLATILE_CV_PCT: f64 = 20.0;
/// Runs required before any trend is computed.
pub const MIN_TREND_RUNS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub name: String,
    #[serde(rename = "metric_type")]
    pub category: MetricCategory,
    pub values: Vec<f64>,
    #[serde(rename = "mean_ns")]
    pub mean: f64,
    #[serde(rename = "std_dev_ns")]
    pub std_dev: f64,
    pub cv_pct: f64,
    pub total_change_pct: f64,
    pub regression_count: usize,
    pub improvement_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendClass {
    SustainedRegression,
    Improving,
    Volatile,
    Stable,
}

impl TrendRecord {
    /// Builds the record for one series; `None` when the series has fewer
    /// than two values or a zero mean.
    pub fn from_series(name: &str, values: Vec<f64>, category: MetricCategory) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        if mean == 0.0 {
            return None;
        }
        let (regression_count, improvement_count) = step_counts(&values);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let std_dev = variance.sqrt();
        let cv_pct = if mean > 0.0 {
            std_dev / mean * 100.0
        } else {
            0.0
        };
        let first = values[0];
        let last = values[values.len() - 1];
        let total_change_pct = if first > 0.0 {
            (last - first) / first * 100.0
        } else {
            0.0
        };
        Some(Self {
            name: name.to_string(),
            category,
            values,
            mean,
            std_dev,
            cv_pct,
            total_change_pct,
            regression_count,
            improvement_count,
        })
    }

    pub fn steps(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    pub fn classify(&self, threshold: f64) -> TrendClass {
        if self.cv_pct > VOLATILE_CV_PCT {
            TrendClass::Volatile
        } else if self.regression_count >= self.steps() && self.total_change_pct > threshold {
            TrendClass::SustainedRegression
        } else if self.improvement_count >= self.steps() && self.total_change_pct < -threshold {
            TrendClass::Improving
        } else {
            TrendClass::Stable
        }
    }
}

fn step_counts(values: &[f64]) -> (usize, usize) {
    values.windows(2).fold((0, 0), |(worse, better), pair| {
        let (prev, next) = (pair[0], pair[1]);
        (
            worse + usize::from(next > prev * WORSENING_STEP),
            better + usize::from(next < prev * IMPROVING_STEP),
        )
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub sustained_regressions: Vec<TrendRecord>,
    pub improving: Vec<TrendRecord>,
    pub volatile: Vec<TrendRecord>,
    pub stable: Vec<TrendRecord>,
    pub window_size: usize,
}

impl TrendSummary {
    pub fn has_sustained_regressions(&self) -> bool {
        !self.sustained_regressions.is_empty()
    }

    pub fn metric_count(&self) -> usize {
        self.sustained_regressions.len()
            + self.improving.len()
            + self.volatile.len()
            + self.stable.len()
    }

    fn push(&mut self, class: TrendClass, record: TrendRecord) {
        match class {
            TrendClass::SustainedRegression => self.sustained_regressions.push(record),
            TrendClass::Improving => self.improving.push(record),
            TrendClass::Volatile => self.volatile.push(record),
            TrendClass::Stable => self.stable.push(record),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendReport {
    InsufficientData { runs_available: usize },
    Analyzed(TrendSummary),
}

impl TrendReport {
    pub fn summary(&self) -> Option<&TrendSummary> {
        match self {
            TrendReport::Analyzed(summary) => Some(summary),
            TrendReport::InsufficientData { .. } => None,
        }
    }

    pub fn has_sustained_regressions(&self) -> bool {
        self.summary()
            .is_some_and(TrendSummary::has_sustained_regressions)
    }
}

/// Analyzes the newest `window` runs of `history`.
pub fn analyze(history: &History, window: usize, thresholds: &Thresholds) -> TrendReport {
    if history.len() < MIN_TREND_RUNS {
        return TrendReport::InsufficientData {
            runs_available: history.len(),
        };
    }
    let runs = history.recent(window);
    let mut summary = TrendSummary {
        window_size: runs.len(),
        ..TrendSummary::default()
    };
    for name in metric_names(runs) {
        let values: Vec<f64> = runs
            .iter()
            .filter_map(|run| run.benchmarks.get(name))
            .collect();
        let classification = classify(name, thresholds);
        let Some(record) = TrendRecord::from_series(name, values, classification.category) else {
            continue;
        };
        let class = record.classify(classification.threshold);
        summary.push(class, record);
    }
    TrendReport::Analyzed(summary)
}

/// Union of metric names across `runs`, in first-seen order.
fn metric_names(runs: &[HistoryRun]) -> Vec<&str> {
    let mut seen = AHashSet::new();
    let mut names = Vec::new();
    for run in runs {
        for name in run.benchmarks.names() {
            if seen.insert(name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_counts_use_five_percent_band() {
        assert_eq!(step_counts(&[100.0, 105.0, 106.0]), (0, 0));
        assert_eq!(step_counts(&[100.0, 106.0, 100.0]), (1, 1));
        assert_eq!(step_counts(&[100.0, 94.0, 89.0]), (0, 2));
    }

    #[test]
    fn zero_first_value_reports_no_change() {
        let record =
            TrendRecord::from_series("x", vec![0.0, 10.0, 20.0], MetricCategory::Other).unwrap();
        assert_eq!(record.total_change_pct, 0.0);
    }

    #[test]
    fn zero_mean_series_is_skipped() {
        assert!(TrendRecord::from_series("x", vec![0.0, 0.0], MetricCategory::Other).is_none());
    }

    #[test]
    fn single_value_series_is_skipped() {
        assert!(TrendRecord::from_series("x", vec![5.0], MetricCategory::Other).is_none());
    }

    #[test]
    fn population_variance_divides_by_count() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let record = TrendRecord::from_series("x", values, MetricCategory::Other).unwrap();
        assert!((record.mean - 5.0).abs() < 1e-12);
        assert!((record.std_dev - 2.0).abs() < 1e-12);
        assert!((record.cv_pct - 40.0).abs() < 1e-9);
    }
}
