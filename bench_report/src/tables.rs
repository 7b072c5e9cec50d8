use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    aggregate::{self, ExeSummary},
    compare::Comparison,
    data::Observation,
    stats::Stats,
};

/// Undefined statistics are written as empty cells.
fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Serialize)]
struct BenchSummaryRow<'a> {
    exe: &'a str,
    mean: f64,
    median: f64,
    std: Option<f64>,
    min: f64,
    max: f64,
    n: usize,
    pct_vs_baseline: Option<f64>,
    cov: Option<f64>,
}

impl<'a> From<&'a ExeSummary> for BenchSummaryRow<'a> {
    fn from(s: &'a ExeSummary) -> Self {
        BenchSummaryRow {
            exe: &s.exe,
            mean: s.stats.mean,
            median: s.stats.median,
            std: defined(s.stats.std),
            min: s.stats.min,
            max: s.stats.max,
            n: s.stats.n,
            pct_vs_baseline: defined(s.pct_vs_baseline),
            cov: defined(s.stats.cov()),
        }
    }
}

#[derive(Debug, Serialize)]
struct MasterRow<'a> {
    bench: &'a str,
    exe: &'a str,
    mean: f64,
    median: f64,
    std: Option<f64>,
    min: f64,
    max: f64,
    n: usize,
}

impl<'a> MasterRow<'a> {
    fn new(bench: &'a str, exe: &'a str, stats: &Stats) -> Self {
        MasterRow {
            bench,
            exe,
            mean: stats.mean,
            median: stats.median,
            std: defined(stats.std),
            min: stats.min,
            max: stats.max,
            n: stats.n,
        }
    }
}

#[derive(Debug, Serialize)]
struct OverallRow<'a> {
    rank: usize,
    exe: &'a str,
    geo_mean_speedup_vs_baseline: Option<f64>,
    median_speedup_vs_baseline: Option<f64>,
    win_rate: f64,
}

#[derive(Debug, Serialize)]
struct MetricOverallRow<'a> {
    metric: &'a str,
    rank: usize,
    exe: &'a str,
    geo_mean_speedup_vs_baseline: Option<f64>,
    median_speedup_vs_baseline: Option<f64>,
    win_rate: f64,
}

fn to_csv_bytes<S: Serialize>(rows: impl IntoIterator<Item = S>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV table: {}", e))
}

fn write_csv_file<S: Serialize>(path: &Path, rows: impl IntoIterator<Item = S>) -> Result<()> {
    let bytes = to_csv_bytes(rows)?;
    write_file(path, &bytes)
}

/// Writes `content` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Statistics per exe for one benchmark, sorted by mean.
pub fn bench_summary_csv(summary: &[ExeSummary]) -> Result<Vec<u8>> {
    to_csv_bytes(summary.iter().map(BenchSummaryRow::from))
}

/// One `<bench>.csv` per benchmark below `dir`.
pub fn write_bench_summaries(
    dir: &Path,
    observations: &[&Observation],
    baseline: &str,
) -> Result<()> {
    let by_bench = aggregate::group_values(observations.iter().copied(), |o| o.bench.clone());
    for bench in by_bench.keys() {
        let bench_observations = crate::filter::select_bench(observations, bench);
        let summary = aggregate::bench_summary(&bench_observations, baseline);
        for s in &summary {
            log::debug!("{} {}: {}", bench, s.exe, s.stats);
        }
        write_file(
            &dir.join(format!("{}.csv", file_stem(bench))),
            &bench_summary_csv(&summary)?,
        )?;
    }
    Ok(())
}

/// Statistics per (bench, exe) of one metric.
pub fn write_master_summary(path: &Path, observations: &[&Observation]) -> Result<()> {
    let stats =
        aggregate::summarize_by(observations.iter().copied(), |o| (o.bench.clone(), o.exe.clone()));
    write_csv_file(
        path,
        stats
            .iter()
            .map(|((bench, exe), s)| MasterRow::new(bench, exe, s)),
    )
}

/// The ranking table of one metric.
pub fn overall_csv(comparison: &Comparison) -> Result<Vec<u8>> {
    to_csv_bytes(comparison.ranking.iter().map(|r| OverallRow {
        rank: r.rank,
        exe: &r.exe,
        geo_mean_speedup_vs_baseline: defined(r.geo_mean_speedup),
        median_speedup_vs_baseline: defined(r.median_speedup),
        win_rate: r.win_rate,
    }))
}

/// The ranking tables of several metrics in one table with a `metric` column.
pub fn combined_overall_csv(comparisons: &[(&str, &Comparison)]) -> Result<Vec<u8>> {
    to_csv_bytes(comparisons.iter().flat_map(|(metric, comparison)| {
        comparison.ranking.iter().map(move |r| MetricOverallRow {
            metric,
            rank: r.rank,
            exe: &r.exe,
            geo_mean_speedup_vs_baseline: defined(r.geo_mean_speedup),
            median_speedup_vs_baseline: defined(r.median_speedup),
            win_rate: r.win_rate,
        })
    }))
}

/// Benchmark names are used as file names; path separators are replaced.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}
