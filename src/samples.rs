use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One measured point estimate, usually a Criterion mean in nanoseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub name: String,
    pub value: f64,
}

impl Sample {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// All results of a single run keyed by metric name.
///
/// Names are unique and iterate in lexicographic order, so anything derived
/// from a `SampleSet` is deterministic regardless of how it was collected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet {
    values: BTreeMap<String, f64>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl FromIterator<Sample> for SampleSet {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|sample| (sample.name, sample.value))
            .collect();
        Self { values }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for SampleSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self { values }
    }
}
