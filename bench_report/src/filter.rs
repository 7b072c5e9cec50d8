use anyhow::{Context, Result};
use itertools::Itertools;
use regex::Regex;

use crate::data::{MetricSpec, Observation};

/// Compile filter patterns into regex objects
pub fn compile_filters(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).with_context(|| format!("Invalid regex pattern: '{}'", pattern))
        })
        .collect()
}

/// Check if a name matches any of the compiled filters
/// Returns true if filters is empty (no filters = match all)
pub fn matches_any_filter(name: &str, filters: &[Regex]) -> bool {
    if filters.is_empty() {
        return true; // No filters = match all
    }
    filters.iter().any(|re| re.is_match(name))
}

/// Row selection applied right after loading.
#[derive(Debug, Default)]
pub struct ObservationFilter {
    excluded_suites: Vec<String>,
    benches: Vec<Regex>,
    exes: Vec<Regex>,
}

impl ObservationFilter {
    pub fn new(
        excluded_suites: Vec<String>,
        bench_patterns: &[String],
        exe_patterns: &[String],
    ) -> Result<ObservationFilter> {
        Ok(ObservationFilter {
            excluded_suites,
            benches: compile_filters(bench_patterns)?,
            exes: compile_filters(exe_patterns)?,
        })
    }

    #[must_use]
    pub fn accepts(&self, observation: &Observation) -> bool {
        !self.excluded_suites.contains(&observation.suite)
            && matches_any_filter(&observation.bench, &self.benches)
            && matches_any_filter(&observation.exe, &self.exes)
    }

    pub fn apply(&self, observations: Vec<Observation>) -> Vec<Observation> {
        let before = observations.len();
        let kept = observations
            .into_iter()
            .filter(|o| self.accepts(o))
            .collect_vec();
        log::info!("Kept {} of {} observations after filtering", kept.len(), before);
        kept
    }
}

/// All observations measuring the given metric.
pub fn select_metric<'a>(observations: &'a [Observation], metric: &MetricSpec) -> Vec<&'a Observation> {
    observations.iter().filter(|o| metric.matches(o)).collect()
}

/// Observations of a single benchmark.
pub fn select_bench<'a>(observations: &[&'a Observation], bench: &str) -> Vec<&'a Observation> {
    observations
        .iter()
        .filter(|o| o.bench == bench)
        .copied()
        .collect()
}

/// Sorted distinct benchmark names.
pub fn benches<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Vec<String> {
    observations
        .into_iter()
        .map(|o| o.bench.clone())
        .sorted()
        .dedup()
        .collect()
}

/// Sorted distinct environment ids.
pub fn environments<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Vec<String> {
    observations
        .into_iter()
        .map(|o| o.envid.clone())
        .sorted()
        .dedup()
        .collect()
}
