use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::{
    aggregate::mean_by,
    data::Observation,
    stats::{self, VecAggregation},
};

/// Mean value per benchmark and exe: `bench -> exe -> mean`.
pub type BenchMeans = BTreeMap<String, BTreeMap<String, f64>>;

/// Position of one configuration in the overall comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub rank: usize,
    pub exe: String,
    pub geo_mean_speedup: f64,
    pub median_speedup: f64,
    pub win_rate: f64,
}

/// Result of comparing all configurations of a metric against the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub baseline: String,
    /// Benchmarks that have baseline observations.
    pub benches: Vec<String>,
    /// Best configuration first.
    pub ranking: Vec<Ranking>,
    speedups: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Comparison {
    /// `mean(baseline) / mean(exe)` for one benchmark, if defined.
    pub fn speedup(&self, bench: &str, exe: &str) -> Option<f64> {
        self.speedups.get(exe)?.get(bench).copied()
    }

    /// All finite per benchmark speedups of `exe`, in benchmark order.
    pub fn speedups_of(&self, exe: &str) -> Vec<f64> {
        self.speedups
            .get(exe)
            .map(|by_bench| {
                by_bench
                    .values()
                    .copied()
                    .filter(|s| s.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_baseline(&self, exe: &str) -> bool {
        self.baseline == exe
    }
}

pub fn bench_means<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> BenchMeans {
    let mut result = BenchMeans::new();
    for ((bench, exe), mean) in mean_by(observations, |o| (o.bench.clone(), o.exe.clone())) {
        result.entry(bench).or_default().insert(exe, mean);
    }
    result
}

/// Mean of the benchmark means of every exe, over all benchmarks.
pub fn overall_means(means: &BenchMeans) -> BTreeMap<String, f64> {
    let mut per_exe: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for by_exe in means.values() {
        for (exe, mean) in by_exe {
            per_exe.entry(exe).or_default().push(*mean);
        }
    }
    per_exe
        .into_iter()
        .filter_map(|(exe, values)| stats::mean(values).map(|m| (exe.to_string(), m)))
        .collect()
}

fn speedup(baseline_mean: f64, mean: f64) -> Option<f64> {
    if baseline_mean.is_finite() && baseline_mean > 0.0 {
        Some(baseline_mean / mean)
    } else {
        None
    }
}

/// Compares every configuration against `baseline`.
///
/// Only benchmarks with baseline observations take part. Returns `None` if
/// the baseline has no observations at all.
pub fn compare(means: &BenchMeans, baseline: &str) -> Option<Comparison> {
    let compared: BTreeMap<&String, &BTreeMap<String, f64>> = means
        .iter()
        .filter(|(_, by_exe)| by_exe.contains_key(baseline))
        .collect();
    if compared.is_empty() {
        return None;
    }

    let exes: BTreeSet<&String> = compared.values().flat_map(|by_exe| by_exe.keys()).collect();

    let mut speedups: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut wins: BTreeMap<&str, usize> = BTreeMap::new();
    for (bench, by_exe) in &compared {
        let baseline_mean = by_exe[baseline];
        let best = by_exe.values().copied().fold(f64::INFINITY, f64::min);
        for (exe, mean) in by_exe.iter() {
            if let Some(s) = speedup(baseline_mean, *mean) {
                speedups
                    .entry(exe.clone())
                    .or_default()
                    .insert((*bench).clone(), s);
            }
            if *mean == best {
                *wins.entry(exe.as_str()).or_default() += 1;
            }
        }
    }

    let bench_count = compared.len() as f64;
    let unranked = exes
        .iter()
        .map(|exe| {
            let exe_speedups = speedups
                .get(exe.as_str())
                .map(|by_bench| by_bench.values().copied().collect_vec())
                .unwrap_or_default();
            let median_speedup = exe_speedups
                .iter()
                .copied()
                .filter(|s| !s.is_nan())
                .collect_vec()
                .median()
                .unwrap_or(f64::NAN);
            Ranking {
                rank: 0,
                exe: exe.to_string(),
                geo_mean_speedup: stats::geometric_mean(exe_speedups),
                median_speedup,
                win_rate: wins.get(exe.as_str()).copied().unwrap_or(0) as f64 / bench_count,
            }
        })
        .collect_vec();

    Some(Comparison {
        baseline: baseline.to_string(),
        benches: compared.keys().map(|b| b.to_string()).collect(),
        ranking: rank(unranked),
        speedups,
    })
}

/// Convenience wrapper computing the benchmark means first.
pub fn compare_observations(observations: &[&Observation], baseline: &str) -> Option<Comparison> {
    compare(&bench_means(observations.iter().copied()), baseline)
}

/// Descending order with undefined values last.
fn cmp_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn ranking_key(r: &Ranking) -> [f64; 3] {
    [r.geo_mean_speedup, r.win_rate, r.median_speedup]
}

fn cmp_keys(a: [f64; 3], b: [f64; 3]) -> Ordering {
    a.into_iter()
        .zip(b)
        .map(|(a, b)| cmp_desc(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sorts and assigns dense ranks: configurations tied on all three criteria
/// share a rank, the next one gets the following number.
fn rank(mut rankings: Vec<Ranking>) -> Vec<Ranking> {
    rankings.sort_by(|a, b| cmp_keys(ranking_key(a), ranking_key(b)));
    let mut current = 0;
    let mut previous = None;
    for ranking in &mut rankings {
        let key = ranking_key(ranking);
        if !matches!(previous, Some(p) if cmp_keys(p, key).is_eq()) {
            current += 1;
        }
        ranking.rank = current;
        previous = Some(key);
    }
    rankings
}
