use std::fmt::Display;

use average::{self, concatenate, Estimate, Max, Mean, Min, Variance};
use itertools::Itertools;

use readable::num::*;

pub trait VecAggregation {
    fn median(&mut self) -> Option<f64>;
}

concatenate!(
    AggStats,
    [Min, min],
    [Max, max],
    [Mean, mean],
    [Variance, sample_variance]
);

/// Summary statistics of one group of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, NaN for less than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    /// Computes the statistics of the given values.
    /// Returns `None` for an empty group.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Stats> {
        let mut values = values.into_iter().collect_vec();
        if values.is_empty() {
            return None;
        }
        let s: AggStats = values.iter().copied().collect();
        let n = s.mean.len() as usize;
        let std = if n < 2 {
            f64::NAN
        } else {
            s.sample_variance().sqrt()
        };
        Some(Stats {
            mean: s.mean(),
            median: values.median()?,
            std,
            min: s.min(),
            max: s.max(),
            n,
        })
    }

    /// Coefficient of variation (std / mean).
    pub fn cov(&self) -> f64 {
        self.std / self.mean
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "μ: {} median: {} σ: {} n: {}",
            Float::from(self.mean),
            Float::from(self.median),
            Float::from(self.std),
            Unsigned::from(self.n),
        )
    }
}

impl VecAggregation for Vec<f64> {
    fn median(&mut self) -> Option<f64> {
        self.sort_by(f64::total_cmp);
        match self.len() {
            0 => None,
            even if even % 2 == 0 => {
                let left = self[even / 2 - 1];
                let right = self[even / 2];
                Some((left + right) / 2.0)
            }
            odd => Some(self[odd / 2]),
        }
    }
}

/// Arithmetic mean, `None` if there are no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let m: Mean = values.into_iter().collect();
    if m.is_empty() {
        None
    } else {
        Some(m.mean())
    }
}

/// Geometric mean over the finite, strictly positive values.
/// NaN if no such value exists.
pub fn geometric_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let usable = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect_vec();
    match usable.as_slice() {
        [] => f64::NAN,
        [single] => *single,
        _ => mean(usable.iter().map(|v| v.ln())).map_or(f64::NAN, f64::exp),
    }
}
