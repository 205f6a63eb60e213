use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    classify::{MetricCategory, classify},
    config::Thresholds,
    samples::SampleSet,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub name: String,
    #[serde(rename = "baseline_ns")]
    pub baseline_value: f64,
    #[serde(rename = "current_ns")]
    pub current_value: f64,
    pub diff_pct: f64,
    #[serde(rename = "metric_type")]
    pub category: MetricCategory,
    pub threshold: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Regressed,
    Improved,
    Unchanged,
}

impl ComparisonResult {
    pub fn verdict(&self) -> Verdict {
        if self.diff_pct > self.threshold {
            Verdict::Regressed
        } else if self.diff_pct < -self.threshold {
            Verdict::Improved
        } else {
            Verdict::Unchanged
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comparison {
    pub regressed: Vec<ComparisonResult>,
    pub improved: Vec<ComparisonResult>,
    pub unchanged: Vec<ComparisonResult>,
}

impl Comparison {
    pub fn has_regressions(&self) -> bool {
        !self.regressed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regressed.len() + self.improved.len() + self.unchanged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.regressed
            .iter()
            .chain(self.improved.iter())
            .chain(self.unchanged.iter())
    }

    pub fn regressions_by_category(&self) -> BTreeMap<MetricCategory, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.regressed {
            *counts.entry(result.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Compares every metric in `current` against `baseline`.
///
/// Metrics missing from `baseline`, and metrics whose baseline is exactly
/// zero, are left out of every bucket.
pub fn compare(baseline: &SampleSet, current: &SampleSet, thresholds: &Thresholds) -> Comparison {
    let mut comparison = Comparison::default();
    for (name, current_value) in current.iter() {
        let Some(baseline_value) = baseline.get(name) else {
            continue;
        };
        if baseline_value == 0.0 {
            continue;
        }
        let diff_pct = (current_value - baseline_value) / baseline_value * 100.0;
        let classification = classify(name, thresholds);
        let result = ComparisonResult {
            name: name.to_string(),
            baseline_value,
            current_value,
            diff_pct,
            category: classification.category,
            threshold: classification.threshold,
        };
        match result.verdict() {
            Verdict::Regressed => comparison.regressed.push(result),
            Verdict::Improved => comparison.improved.push(result),
            Verdict::Unchanged => comparison.unchanged.push(result),
        }
    }
    comparison
}
