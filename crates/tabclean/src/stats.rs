//! Numeric statistics shared by the cleaning handlers.
//!
//! Mean and variance use Welford's online algorithm in a single pass.
//! Quantiles are exact: values are sorted once and interpolated linearly
//! between the two closest ranks.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{CellKey, Value};

// =============================================================================
// RUNNING MOMENTS
// =============================================================================

/// Single-pass mean/variance accumulator.
#[derive(Debug, Clone)]
struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64, // Sum of squared differences from mean
    min: f64,
    max: f64,
}

impl RunningMoments {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Sample variance (n - 1). Zero with fewer than two values.
    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Summary statistics for the non-missing values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericStatistics {
    /// Compute statistics over `values`. Returns `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut moments = RunningMoments::new();
        for &value in values {
            moments.add(value);
        }
        let sorted = sorted(values);

        Some(Self {
            count: moments.count,
            min: moments.min,
            max: moments.max,
            mean: moments.mean,
            std: moments.variance().sqrt(),
            median: quantile(&sorted, 0.5),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    /// Compute statistics over the present entries of a numeric view.
    pub fn from_column(values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        Self::from_values(&present)
    }

    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Calculate the z-score for a value. Zero when the deviation is zero.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Return a sorted copy of `values` (total order, NaN last).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Greater));
    out
}

/// Quantile `p` in `[0, 1]` of sorted data, linearly interpolated.
///
/// Returns `NaN` for empty input.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = p.clamp(0.0, 1.0);
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Most frequent non-missing value. Ties go to the value seen first.
pub fn mode(values: &[Value]) -> Option<Value> {
    let mut counts: IndexMap<CellKey, (usize, usize)> = IndexMap::new();
    for (idx, value) in values.iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        counts.entry(value.key()).or_insert((0, idx)).0 += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for &(count, first_idx) in counts.values() {
        match best {
            Some((best_count, _)) if count <= best_count => {}
            _ => best = Some((count, first_idx)),
        }
    }
    best.map(|(_, idx)| values[idx].clone())
}
