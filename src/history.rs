//! In-memory run history.
//!
//! Runs are kept in insertion order. Appending never drops anything; callers
//! cap the history explicitly with [`History::trim`], normally right before
//! persisting it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{BenchTrendError, samples::SampleSet};

pub const HISTORY_VERSION: u32 = 1;

const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Offset-free ISO 8601 layouts, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRun {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    #[serde(default)]
    pub benchmarks: SampleSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default = "history_version")]
    pub version: u32,
    #[serde(default)]
    pub runs: Vec<HistoryRun>,
}

fn history_version() -> u32 {
    HISTORY_VERSION
}

impl Default for History {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION,
            runs: Vec::new(),
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Appends `benchmarks` stamped with the current UTC time.
    pub fn append(&mut self, benchmarks: SampleSet, run_id: Option<String>) -> &HistoryRun {
        self.append_at(benchmarks, run_id, Utc::now())
    }

    pub fn append_at(
        &mut self,
        benchmarks: SampleSet,
        run_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> &HistoryRun {
        let run_id = run_id.unwrap_or_else(|| fallback_run_id(&timestamp));
        self.runs.push(HistoryRun {
            timestamp,
            run_id,
            benchmarks,
        });
        &self.runs[self.runs.len() - 1]
    }

    /// Keeps only the newest `limit` runs. Returns how many were dropped.
    pub fn trim(&mut self, limit: usize) -> usize {
        let excess = self.runs.len().saturating_sub(limit);
        if excess > 0 {
            self.runs.drain(..excess);
        }
        excess
    }

    /// The newest `window` runs in insertion order; all runs when `window`
    /// is zero or exceeds the history length.
    pub fn recent(&self, window: usize) -> &[HistoryRun] {
        if window == 0 || window >= self.runs.len() {
            return &self.runs;
        }
        &self.runs[self.runs.len() - window..]
    }
}

pub fn fallback_run_id(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(RUN_ID_FORMAT).to_string()
}

/// Parses an ISO 8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BenchTrendError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| BenchTrendError::parse(format!("unrecognized timestamp {raw:?}")))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
