use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    data::Observation,
    stats::{Stats, VecAggregation},
};

/// Collects the non-missing values of every group.
/// Groups without any value do not appear in the result.
pub fn group_values<'a, K, F>(
    observations: impl IntoIterator<Item = &'a Observation>,
    key: F,
) -> BTreeMap<K, Vec<f64>>
where
    K: Ord,
    F: Fn(&Observation) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for o in observations {
        if let Some(v) = o.value {
            groups.entry(key(o)).or_default().push(v);
        }
    }
    groups
}

/// Statistics per group key.
pub fn summarize_by<'a, K, F>(
    observations: impl IntoIterator<Item = &'a Observation>,
    key: F,
) -> BTreeMap<K, Stats>
where
    K: Ord,
    F: Fn(&Observation) -> K,
{
    group_values(observations, key)
        .into_iter()
        .filter_map(|(k, values)| Stats::from_values(values).map(|s| (k, s)))
        .collect()
}

/// Mean per group key.
pub fn mean_by<'a, K, F>(
    observations: impl IntoIterator<Item = &'a Observation>,
    key: F,
) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&Observation) -> K,
{
    summarize_by(observations, key)
        .into_iter()
        .map(|(k, s)| (k, s.mean))
        .collect()
}

/// One row of the collapsed median table.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedMedian {
    pub suite: String,
    pub bench: String,
    pub inputsize: Option<i64>,
    pub exe: String,
    pub median: f64,
}

/// Two pass median: the median of every invocation, then the median of the
/// invocation medians per (bench, exe, suite, inputsize).
///
/// Rows are sorted by suite, bench, input size and median.
pub fn collapsed_medians<'a>(
    observations: impl IntoIterator<Item = &'a Observation>,
) -> Vec<CollapsedMedian> {
    let per_invocation = group_values(observations, |o| {
        (
            o.bench.clone(),
            o.exe.clone(),
            o.suite.clone(),
            o.inputsize,
            o.invocation,
        )
    });

    let mut per_series: BTreeMap<(String, String, String, Option<i64>), Vec<f64>> =
        BTreeMap::new();
    for ((bench, exe, suite, inputsize, _), mut values) in per_invocation {
        if let Some(median) = values.median() {
            per_series
                .entry((bench, exe, suite, inputsize))
                .or_default()
                .push(median);
        }
    }

    per_series
        .into_iter()
        .filter_map(|((bench, exe, suite, inputsize), mut medians)| {
            medians.median().map(|median| CollapsedMedian {
                suite,
                bench,
                inputsize,
                exe,
                median,
            })
        })
        .sorted_by(|a, b| {
            a.suite
                .cmp(&b.suite)
                .then_with(|| a.bench.cmp(&b.bench))
                .then_with(|| a.inputsize.is_none().cmp(&b.inputsize.is_none()))
                .then_with(|| a.inputsize.cmp(&b.inputsize))
                .then_with(|| a.median.total_cmp(&b.median))
        })
        .collect()
}

/// Median per bench (rows) and exe (columns).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pivot {
    pub benches: Vec<String>,
    pub exes: Vec<String>,
    cells: BTreeMap<(String, String), f64>,
}

impl Pivot {
    pub fn get(&self, bench: &str, exe: &str) -> Option<f64> {
        self.cells
            .get(&(bench.to_string(), exe.to_string()))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn median_pivot<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Pivot {
    let cells: BTreeMap<(String, String), f64> =
        summarize_by(observations, |o| (o.bench.clone(), o.exe.clone()))
            .into_iter()
            .map(|(k, s)| (k, s.median))
            .collect();
    let benches = cells.keys().map(|(b, _)| b.clone()).dedup().collect();
    let exes = cells.keys().map(|(_, e)| e.clone()).sorted().dedup().collect();
    Pivot {
        benches,
        exes,
        cells,
    }
}

/// Statistics of one exe within a single benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct ExeSummary {
    pub exe: String,
    pub stats: Stats,
    /// `baseline_mean / mean - 1`, NaN if the baseline has no values.
    pub pct_vs_baseline: f64,
}

/// Per exe statistics of the observations of one benchmark, sorted by mean.
pub fn bench_summary(observations: &[&Observation], baseline: &str) -> Vec<ExeSummary> {
    let stats = summarize_by(observations.iter().copied(), |o| o.exe.clone());
    let base_mean = stats.get(baseline).map(|s| s.mean);
    stats
        .into_iter()
        .map(|(exe, stats)| ExeSummary {
            pct_vs_baseline: base_mean.map_or(f64::NAN, |b| b / stats.mean - 1.0),
            exe,
            stats,
        })
        .sorted_by(|a, b| a.stats.mean.total_cmp(&b.stats.mean))
        .collect()
}

/// Exe names ordered by ascending mean value.
pub fn exe_order_by_mean(observations: &[&Observation]) -> Vec<String> {
    mean_by(observations.iter().copied(), |o| o.exe.clone())
        .into_iter()
        .sorted_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(exe, _)| exe)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{observation, synthetic_observations};

    fn invocation(bench: &str, exe: &str, invocation: i64, value: f64) -> Observation {
        Observation {
            invocation: Some(invocation),
            ..observation(bench, exe, value)
        }
    }

    #[test]
    fn counts_add_up_to_non_missing_rows() {
        let mut observations = synthetic_observations(3, 3, 2, 3);
        observations[0].value = None;
        observations[5].value = None;
        let non_missing = observations.iter().filter(|o| o.value.is_some()).count();

        let stats = summarize_by(&observations, |o| {
            (o.bench.clone(), o.exe.clone(), o.suite.clone(), o.inputsize)
        });
        let total: usize = stats.values().map(|s| s.n).sum();
        assert_eq!(total, non_missing);
    }

    #[test]
    fn groups_without_values_are_skipped() {
        let mut missing = observation("Bounce", "x", 0.0);
        missing.value = None;
        let observations = vec![missing, observation("Bounce", "base", 3.0)];
        let stats = summarize_by(&observations, |o| o.exe.clone());
        assert_eq!(stats.keys().collect_vec(), vec!["base"]);
    }

    #[test]
    fn two_pass_median() {
        let observations = vec![
            // invocation 1: median 2
            invocation("Bounce", "base", 1, 1.0),
            invocation("Bounce", "base", 1, 2.0),
            invocation("Bounce", "base", 1, 100.0),
            // invocation 2: median 4
            invocation("Bounce", "base", 2, 4.0),
            // invocation 3: median 10
            invocation("Bounce", "base", 3, 10.0),
            invocation("Bounce", "base", 3, 10.0),
            invocation("Bounce", "fast", 1, 1.0),
        ];
        let rows = collapsed_medians(&observations);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].exe, "fast");
        assert_eq!(rows[0].median, 1.0);
        assert_eq!(rows[1].exe, "base");
        assert_eq!(rows[1].median, 4.0);
    }

    #[test]
    fn collapsed_rows_are_sorted() {
        let mut other_suite = observation("Aaa", "base", 1.0);
        other_suite.suite = "zzz".into();
        let observations = vec![
            other_suite,
            observation("Json", "base", 5.0),
            observation("Bounce", "slow", 9.0),
            observation("Bounce", "base", 3.0),
        ];
        let order = collapsed_medians(&observations)
            .into_iter()
            .map(|r| format!("{}/{}/{}", r.suite, r.bench, r.exe))
            .collect_vec();
        assert_eq!(
            order,
            vec![
                "macro/Bounce/base",
                "macro/Bounce/slow",
                "macro/Json/base",
                "zzz/Aaa/base"
            ]
        );
    }

    #[test]
    fn missing_input_size_sorts_last() {
        let sized = |inputsize: Option<i64>, value: f64| Observation {
            inputsize,
            ..observation("Bounce", "base", value)
        };
        let observations = vec![sized(None, 1.0), sized(Some(10), 2.0), sized(Some(2), 3.0)];
        let sizes = collapsed_medians(&observations)
            .into_iter()
            .map(|r| r.inputsize)
            .collect_vec();
        assert_eq!(sizes, vec![Some(2), Some(10), None]);
    }

    #[test]
    fn pivot_of_medians() {
        let observations = vec![
            observation("Bounce", "base", 1.0),
            observation("Bounce", "base", 3.0),
            observation("Bounce", "fast", 1.0),
            observation("Json", "base", 7.0),
        ];
        let pivot = median_pivot(&observations);
        assert_eq!(pivot.benches, vec!["Bounce", "Json"]);
        assert_eq!(pivot.exes, vec!["base", "fast"]);
        assert_eq!(pivot.get("Bounce", "base"), Some(2.0));
        assert_eq!(pivot.get("Json", "fast"), None);
    }

    #[test]
    fn bench_summary_against_baseline() {
        let observations = vec![
            observation("Bounce", "base", 20.0),
            observation("Bounce", "fast", 10.0),
            observation("Bounce", "slow", 40.0),
        ];
        let refs = observations.iter().collect_vec();
        let summary = bench_summary(&refs, "base");
        assert_eq!(
            summary.iter().map(|s| s.exe.as_str()).collect_vec(),
            vec!["fast", "base", "slow"]
        );
        assert_eq!(summary[0].pct_vs_baseline, 1.0);
        assert_eq!(summary[1].pct_vs_baseline, 0.0);
        assert_eq!(summary[2].pct_vs_baseline, -0.5);

        let without_baseline = bench_summary(&refs, "missing");
        assert!(without_baseline.iter().all(|s| s.pct_vs_baseline.is_nan()));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let observations = synthetic_observations(4, 3, 3, 2);
        assert_eq!(
            collapsed_medians(&observations),
            collapsed_medians(&observations)
        );
        assert_eq!(median_pivot(&observations), median_pivot(&observations));
    }

    #[test]
    fn order_by_mean() {
        let observations = vec![
            observation("Bounce", "base", 20.0),
            observation("Bounce", "fast", 10.0),
            observation("Bounce", "slow", 40.0),
        ];
        let refs = observations.iter().collect_vec();
        assert_eq!(exe_order_by_mean(&refs), vec!["fast", "base", "slow"]);
    }
}
