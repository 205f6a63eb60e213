//! Tolerance and analysis settings.
//!
//! Raw overrides (one global value and/or per-category values) are resolved
//! once into an immutable [`Thresholds`] table. Everything downstream only
//! ever sees the resolved table.
//!
//! ```rust
//! use benchtrend::{MetricCategory, ThresholdOverrides};
//!
//! let resolved = ThresholdOverrides {
//!     memory: Some(25.0),
//!     ..ThresholdOverrides::default()
//! }
//! .resolve()
//! .unwrap();
//! assert_eq!(resolved.for_category(MetricCategory::Memory), 25.0);
//! assert_eq!(resolved.for_category(MetricCategory::Duration), 20.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::{BenchTrendError, classify::MetricCategory};

pub const DEFAULT_THRESHOLD: f64 = 10.0;
pub const DEFAULT_TREND_WINDOW: usize = 5;
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Allowed percentage drift per metric category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub latency: f64,
    pub duration: f64,
    pub memory: f64,
    pub throughput: f64,
    pub other: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            latency: 10.0,
            duration: 20.0,
            memory: 15.0,
            throughput: 10.0,
            other: DEFAULT_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Same tolerance for every category.
    pub fn uniform(pct: f64) -> Self {
        Self {
            latency: pct,
            duration: pct,
            memory: pct,
            throughput: pct,
            other: pct,
        }
    }

    pub fn for_category(&self, category: MetricCategory) -> f64 {
        match category {
            MetricCategory::Latency => self.latency,
            MetricCategory::Duration => self.duration,
            MetricCategory::Memory => self.memory,
            MetricCategory::Throughput => self.throughput,
            MetricCategory::Other => self.other,
        }
    }

    /// `(category, threshold)` pairs in category order.
    pub fn entries(&self) -> impl Iterator<Item = (MetricCategory, f64)> + '_ {
        MetricCategory::ALL
            .into_iter()
            .map(|category| (category, self.for_category(category)))
    }
}

/// Unresolved tolerance settings as supplied by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThresholdOverrides {
    /// Replaces every category's tolerance when set.
    pub global: Option<f64>,
    pub latency: Option<f64>,
    pub duration: Option<f64>,
    pub memory: Option<f64>,
    pub throughput: Option<f64>,
    pub other: Option<f64>,
}

impl ThresholdOverrides {
    pub fn resolve(&self) -> Result<Thresholds, BenchTrendError> {
        if let Some(pct) = self.global {
            validate_pct("threshold", pct)?;
            return Ok(Thresholds::uniform(pct));
        }
        let defaults = Thresholds::default();
        let pick = |label: &str, value: Option<f64>, default: f64| match value {
            Some(pct) => validate_pct(label, pct).map(|_| pct),
            None => Ok(default),
        };
        Ok(Thresholds {
            latency: pick("latency threshold", self.latency, defaults.latency)?,
            duration: pick("duration threshold", self.duration, defaults.duration)?,
            memory: pick("memory threshold", self.memory, defaults.memory)?,
            throughput: pick("throughput threshold", self.throughput, defaults.throughput)?,
            other: pick("other threshold", self.other, defaults.other)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Most recent runs considered by trend analysis.
    pub window: usize,
    /// Runs kept in the history file after each save.
    pub history_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_TREND_WINDOW,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AnalysisConfig {
    pub fn new(window: usize, history_limit: usize) -> Result<Self, BenchTrendError> {
        if window == 0 {
            return Err(BenchTrendError::invalid_input("trend window must be at least 1"));
        }
        if history_limit == 0 {
            return Err(BenchTrendError::invalid_input(
                "history limit must be at least 1",
            ));
        }
        Ok(Self {
            window,
            history_limit,
        })
    }
}

fn validate_pct(label: &str, pct: f64) -> Result<(), BenchTrendError> {
    if !pct.is_finite() || pct < 0.0 {
        return Err(BenchTrendError::invalid_input(format!(
            "{label} must be a non-negative percentage, got {pct}"
        )));
    }
    Ok(())
}
