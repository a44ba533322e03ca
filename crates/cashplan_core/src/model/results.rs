//! Monte Carlo sample collection and percentile reduction
//!
//! Each trial records, per (year, account), the minimum balance seen that
//! year. Raw sample sets are appendable: stored batches merge by plain
//! concatenation and are only reduced to percentile bands at the end.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::AccountId;

/// The (year, account) maps serialize as sorted key/value pair sequences;
/// tuple map keys are not representable in JSON.
mod keyed_pairs {
    use rustc_hash::FxHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::AccountId;

    type Key = (i16, AccountId);

    pub fn serialize<V, S>(map: &FxHashMap<Key, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        let mut pairs: Vec<(&Key, &V)> = map.iter().collect();
        pairs.sort_by_key(|(key, _)| **key);
        serializer.collect_seq(pairs)
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<FxHashMap<Key, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(Key, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// Round to cents.
#[inline]
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed percentile ladder reported for every (year, account) band.
pub const PERCENTILE_LADDER: [u8; 9] = [1, 5, 10, 25, 50, 75, 90, 95, 99];

/// Raw per-trial minimum balances, keyed by (year, account).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonteCarloSamples {
    #[serde(with = "keyed_pairs")]
    pub minimums: FxHashMap<(i16, AccountId), Vec<f64>>,
    pub trials: usize,
}

impl MonteCarloSamples {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial's per-(year, account) minimums.
    pub fn record_trial(&mut self, trial_minimums: impl IntoIterator<Item = ((i16, AccountId), f64)>) {
        for (key, min) in trial_minimums {
            self.minimums.entry(key).or_default().push(min);
        }
        self.trials += 1;
    }

    /// Append another stored batch's raw samples. No recomputation: the
    /// per-trial minimums are simply concatenated before reduction.
    pub fn merge(&mut self, other: MonteCarloSamples) {
        for (key, mut mins) in other.minimums {
            self.minimums.entry(key).or_default().append(&mut mins);
        }
        self.trials += other.trials;
    }

    /// Reduce every sample set to a percentile band, rounded to cents.
    #[must_use]
    pub fn reduce(&self) -> MonteCarloBands {
        let bands = self
            .minimums
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(&key, samples)| {
                let mut sorted = samples.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                (key, PercentileBand::from_sorted(&sorted))
            })
            .collect();
        MonteCarloBands { bands, trials: self.trials }
    }
}

/// Nearest-rank percentile of a sorted slice. Monotone in `p` by
/// construction.
fn percentile(sorted: &[f64], p: u8) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let rank = ((p as f64 / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

/// Outcome band for one (year, account): extremes plus the fixed ladder,
/// all rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    pub min: f64,
    pub p1: f64,
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

impl PercentileBand {
    /// Build a band from an ascending-sorted, non-empty sample set.
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let p = |pct| round_cents(percentile(sorted, pct));
        Self {
            min: round_cents(sorted[0]),
            p1: p(1),
            p5: p(5),
            p10: p(10),
            p25: p(25),
            median: p(50),
            p75: p(75),
            p90: p(90),
            p95: p(95),
            p99: p(99),
            max: round_cents(sorted[sorted.len() - 1]),
        }
    }

    /// The band in ladder order, for monotonicity checks and charting.
    #[must_use]
    pub fn ordered(&self) -> [f64; 11] {
        [
            self.min, self.p1, self.p5, self.p10, self.p25, self.median, self.p75, self.p90,
            self.p95, self.p99, self.max,
        ]
    }
}

/// Reduced Monte Carlo output: one band per (year, account).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonteCarloBands {
    #[serde(with = "keyed_pairs")]
    pub bands: FxHashMap<(i16, AccountId), PercentileBand>,
    pub trials: usize,
}
