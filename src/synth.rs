use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{history::History, samples::SampleSet};

const BASE_RANGE_NS: std::ops::Range<f64> = 1_000.0..1_000_000.0;
const EPOCH_SECS: i64 = 1_700_000_000;

#[derive(Clone, Copy, Debug)]
pub enum SeriesShape {
    /// Same value every run.
    Flat,
    /// Each run is `step_pct` percent above the previous one.
    Drift { step_pct: f64 },
    /// Uniform jitter of up to `spread_pct` percent around the base value.
    Noisy { spread_pct: f64 },
}

/// One sample set with a random base value per name.
pub fn generate_samples(names: &[&str], seed: u64) -> SampleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    names
        .iter()
        .map(|name| (*name, rng.gen_range(BASE_RANGE_NS)))
        .collect()
}

/// `current` scaled per name by a random factor within `±spread_pct`.
pub fn perturb_samples(current: &SampleSet, spread_pct: f64, seed: u64) -> SampleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    current
        .iter()
        .map(|(name, value)| (name, value * jitter(&mut rng, spread_pct)))
        .collect()
}

/// `runs` hourly runs over `names`, every series following `shape`.
pub fn generate_history(names: &[&str], runs: usize, shape: SeriesShape, seed: u64) -> History {
    let base = generate_samples(names, seed);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut history = History::new();
    for idx in 0..runs {
        let benchmarks = base
            .iter()
            .map(|(name, value)| (name, shaped_value(value, idx, shape, &mut rng)))
            .collect();
        history.append_at(benchmarks, Some(format!("run-{idx}")), run_timestamp(idx));
    }
    history
}

fn shaped_value(base: f64, idx: usize, shape: SeriesShape, rng: &mut StdRng) -> f64 {
    match shape {
        SeriesShape::Flat => base,
        SeriesShape::Drift { step_pct } => base * (1.0 + step_pct / 100.0).powi(idx as i32),
        SeriesShape::Noisy { spread_pct } => base * jitter(rng, spread_pct),
    }
}

fn jitter(rng: &mut StdRng, spread_pct: f64) -> f64 {
    if spread_pct <= 0.0 {
        return 1.0;
    }
    let spread = spread_pct / 100.0;
    1.0 + rng.gen_range(-spread..=spread)
}

fn run_timestamp(idx: usize) -> DateTime<Utc> {
    let epoch = Utc
        .timestamp_opt(EPOCH_SECS, 0)
        .single()
        .unwrap_or_default();
    epoch + Duration::hours(idx as i64)
}
