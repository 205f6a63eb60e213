//! Metric name classification.
//!
//! A metric's category decides how much it may drift before it counts as a
//! regression. Categories are matched by case-insensitive substring against
//! an ordered rule list; the first rule with a matching pattern wins even
//! when a later rule would also match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// Semantic grouping of a benchmark name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    /// Search / query / lookup latencies.
    Latency,
    /// Whole-task or suite durations.
    Duration,
    /// Memory usage: RSS, heap, allocations.
    Memory,
    /// Indexing and ingest throughput.
    Throughput,
    /// Anything no rule matched.
    Other,
}

/// Ordered classification rules. Order is significant.
pub const CATEGORY_RULES: &[(MetricCategory, &[&str])] = &[
    (
        MetricCategory::Latency,
        &["search", "query", "latency", "p50", "p95", "lookup"],
    ),
    (
        MetricCategory::Duration,
        &["duration", "time", "suite", "total", "full", "batch"],
    ),
    (
        MetricCategory::Memory,
        &["memory", "mem", "rss", "heap", "alloc", "peak"],
    ),
    (
        MetricCategory::Throughput,
        &["throughput", "index", "ingest", "rate", "per_sec", "convs"],
    ),
];

impl MetricCategory {
    pub const ALL: [MetricCategory; 5] = [
        MetricCategory::Latency,
        MetricCategory::Duration,
        MetricCategory::Memory,
        MetricCategory::Throughput,
        MetricCategory::Other,
    ];

    /// Category of `name` under [`CATEGORY_RULES`].
    pub fn of(name: &str) -> MetricCategory {
        let lowered = name.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| lowered.contains(p)))
            .map(|(category, _)| *category)
            .unwrap_or(MetricCategory::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricCategory::Latency => "latency",
            MetricCategory::Duration => "duration",
            MetricCategory::Memory => "memory",
            MetricCategory::Throughput => "throughput",
            MetricCategory::Other => "other",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub category: MetricCategory,
    pub threshold: f64,
}

pub fn classify(name: &str, thresholds: &Thresholds) -> Classification {
    let category = MetricCategory::of(name);
    Classification {
        category,
        threshold: thresholds.for_category(category),
    }
}
