//! Reads Criterion's saved estimates.
//!
//! Criterion lays results out as
//! `<target>/criterion/<group>/<bench>/<baseline>/estimates.json`; the
//! metric name is `<group>/<bench>` and its value the mean point estimate.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{BenchTrendError, samples::SampleSet};

pub const ESTIMATES_FILE: &str = "estimates.json";

#[derive(Debug, Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Debug, Deserialize)]
struct Estimate {
    point_estimate: f64,
}

pub fn find_criterion_dir(target_dir: &Path) -> Option<PathBuf> {
    let path = target_dir.join("criterion");
    path.is_dir().then_some(path)
}

/// Collects the `baseline` estimates below `criterion_dir`.
///
/// Files that fail to parse are logged and skipped.
pub fn load_estimates(criterion_dir: &Path, baseline: &str) -> Result<SampleSet, BenchTrendError> {
    let mut samples = SampleSet::new();
    for group in sorted_subdirs(criterion_dir)? {
        for bench in sorted_subdirs(&group)? {
            let file = bench.join(baseline).join(ESTIMATES_FILE);
            if !file.is_file() {
                continue;
            }
            match read_point_estimate(&file) {
                Ok(value) => {
                    samples.insert(metric_name(&group, &bench), value);
                }
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "could not parse estimates");
                }
            }
        }
    }
    debug!(baseline, metrics = samples.len(), "loaded criterion estimates");
    Ok(samples)
}

fn read_point_estimate(file: &Path) -> Result<f64, BenchTrendError> {
    let data = fs::read(file).map_err(|e| BenchTrendError::io(e.to_string()))?;
    let estimates: Estimates =
        serde_json::from_slice(&data).map_err(|e| BenchTrendError::parse(e.to_string()))?;
    Ok(estimates.mean.point_estimate)
}

fn metric_name(group: &Path, bench: &Path) -> String {
    format!("{}/{}", file_name(group), file_name(bench))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, BenchTrendError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| BenchTrendError::io(format!("{}: {e}", dir.display())))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BenchTrendError::io(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_estimate_comes_from_mean() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(ESTIMATES_FILE);
        fs::write(
            &file,
            r#"{"mean":{"point_estimate":1234.5,"standard_error":1.0},"median":{"point_estimate":1.0}}"#,
        )
        .unwrap();
        assert_eq!(read_point_estimate(&file).unwrap(), 1234.5);
    }

    #[test]
    fn missing_mean_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(ESTIMATES_FILE);
        fs::write(&file, r#"{"median":{"point_estimate":1.0}}"#).unwrap();
        assert!(matches!(
            read_point_estimate(&file),
            Err(BenchTrendError::ParseError(_))
        ));
    }
}
