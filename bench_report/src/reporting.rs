use std::{
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use itertools::Itertools;

use crate::{
    aggregate::{collapsed_medians, median_pivot},
    charts::{self, Chart},
    compare::{bench_means, compare_observations, overall_means, Comparison},
    data::{MetricSpec, Observation},
    filter::{benches, environments, select_bench, select_metric},
    summary_text::{
        format_collapsed_table, format_overall_summary, format_pivot_table,
    },
    tables::{self, file_stem, write_file},
};

/// Sink for the comparison results of every selected metric.
trait Reporter<'a> {
    fn add_comparison(&mut self, metric: &'a MetricSpec, comparison: Option<&'a Comparison>);
    fn as_bytes(&self) -> Result<Vec<u8>>;
}

#[derive(Default)]
struct TextReporter<'a> {
    blocks: Vec<(&'a str, Option<&'a Comparison>)>,
}

impl<'a> Reporter<'a> for TextReporter<'a> {
    fn add_comparison(&mut self, metric: &'a MetricSpec, comparison: Option<&'a Comparison>) {
        self.blocks.push((metric.key.as_str(), comparison));
    }

    fn as_bytes(&self) -> Result<Vec<u8>> {
        Ok(format_overall_summary(self.blocks.iter().copied()).into_bytes())
    }
}

#[derive(Default)]
struct CsvReporter<'a> {
    comparisons: Vec<(&'a str, &'a Comparison)>,
}

impl<'a> Reporter<'a> for CsvReporter<'a> {
    fn add_comparison(&mut self, metric: &'a MetricSpec, comparison: Option<&'a Comparison>) {
        // Skipped comparisons have no rows.
        if let Some(comparison) = comparison {
            self.comparisons.push((metric.key.as_str(), comparison));
        }
    }

    fn as_bytes(&self) -> Result<Vec<u8>> {
        tables::combined_overall_csv(&self.comparisons)
    }
}

#[derive(Default)]
struct PlotlyReporter<'a> {
    metrics: Vec<(&'a MetricSpec, Option<&'a Comparison>)>,
}

impl<'a> Reporter<'a> for PlotlyReporter<'a> {
    fn add_comparison(&mut self, metric: &'a MetricSpec, comparison: Option<&'a Comparison>) {
        self.metrics.push((metric, comparison));
    }

    fn as_bytes(&self) -> Result<Vec<u8>> {
        Ok(charts::dashboard(&self.metrics).to_html())
    }
}

struct ReporterFactory {}

impl ReporterFactory {
    fn from_file_name<'a>(path: &Path) -> Option<Box<dyn Reporter<'a> + 'a>> {
        if path == Path::new("-") {
            return Some(Box::new(TextReporter::default()) as Box<dyn Reporter<'a> + 'a>);
        }
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(Box::new(TextReporter::default()) as Box<dyn Reporter<'a> + 'a>),
            "csv" => Some(Box::new(CsvReporter::default()) as Box<dyn Reporter<'a> + 'a>),
            "html" => Some(Box::new(PlotlyReporter::default()) as Box<dyn Reporter<'a> + 'a>),
            _ => None,
        }
    }
}

fn write_output(output: &Path, bytes: &[u8]) -> Result<()> {
    if output == Path::new("-") {
        match io::stdout().write_all(bytes) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            res => res,
        }?;
        Ok(())
    } else {
        write_file(output, bytes)
    }
}

/// Compares every configuration against `baseline`, one comparison per metric.
/// Metrics without baseline observations yield `None` and are logged.
fn comparisons<'a>(
    observations: &'a [Observation],
    metrics: &'a [MetricSpec],
    baseline: &str,
) -> Vec<(&'a MetricSpec, Vec<&'a Observation>, Option<Comparison>)> {
    metrics
        .iter()
        .map(|metric| {
            let scope = select_metric(observations, metric);
            let comparison = if scope.is_empty() {
                log::debug!("No observations for metric {}", metric.key);
                None
            } else {
                let comparison = compare_observations(&scope, baseline);
                if comparison.is_none() {
                    log::warn!(
                        "Baseline '{}' has no observations for metric {}, skipping comparison",
                        baseline,
                        metric.key
                    );
                }
                comparison
            };
            (metric, scope, comparison)
        })
        .collect()
}

/// Writes the overall comparison of the given metrics to `output`.
///
/// `-` prints the text summary, otherwise the format follows the file
/// extension (`txt`, `csv` or `html`).
pub fn compare(
    observations: &[Observation],
    metrics: &[MetricSpec],
    baseline: &str,
    output: &Path,
) -> Result<()> {
    let results = comparisons(observations, metrics, baseline);
    let mut reporter = ReporterFactory::from_file_name(output).ok_or_else(|| {
        anyhow!(
            "Could not infer output format from '{}', use '-', .txt, .csv or .html",
            output.display()
        )
    })?;
    for (metric, _, comparison) in &results {
        reporter.add_comparison(metric, comparison.as_ref());
    }
    write_output(output, &reporter.as_bytes()?)
}

/// Collapsed median and pivot tables of every metric.
pub fn summary_text(observations: &[Observation], metrics: &[MetricSpec]) -> String {
    metrics
        .iter()
        .map(|metric| {
            let scope = select_metric(observations, metric);
            format!(
                "{}\n{}",
                format_collapsed_table(metric, &collapsed_medians(scope.iter().copied())),
                format_pivot_table(metric, &median_pivot(scope.iter().copied()))
            )
        })
        .join("\n")
}

pub fn summary(observations: &[Observation], metrics: &[MetricSpec]) -> Result<()> {
    write_output(
        Path::new("-"),
        summary_text(observations, metrics).as_bytes(),
    )
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    pub baseline: String,
    /// Repeat the per-benchmark charts and tables below `envs/<envid>`.
    pub per_environment: bool,
}

/// Box plots and summary tables of one metric below `root`.
fn write_metric_tree(
    root: &Path,
    metric: &MetricSpec,
    scope: &[&Observation],
    baseline: &str,
) -> Result<()> {
    if scope.is_empty() {
        log::debug!("No observations for metric {} in {}", metric.key, root.display());
        return Ok(());
    }

    for bench in benches(scope.iter().copied()) {
        let bench_scope = select_bench(scope, &bench);
        match charts::bench_box_plot(metric, &bench, &bench_scope, Some(baseline)) {
            Some(chart) => chart.write(
                &root
                    .join(&metric.key)
                    .join(format!("{}.html", file_stem(&bench))),
            )?,
            None => log::debug!("No values for {} in metric {}", bench, metric.key),
        }
    }

    let summaries = root.join("summaries");
    tables::write_bench_summaries(&summaries.join(&metric.key), scope, baseline)?;
    tables::write_master_summary(
        &summaries.join(format!("MASTER_{}.csv", metric.key)),
        scope,
    )
}

/// One multi-metric panel per benchmark below `<root>/panels`.
fn write_panels(root: &Path, observations: &[&Observation], metrics: &[MetricSpec]) -> Result<()> {
    let scopes = metrics
        .iter()
        .map(|metric| {
            (
                metric,
                observations
                    .iter()
                    .copied()
                    .filter(|o| metric.matches(o))
                    .collect_vec(),
            )
        })
        .collect_vec();

    let all_benches = benches(scopes.iter().flat_map(|(_, scope)| scope.iter().copied()));
    for bench in all_benches {
        let slices = scopes
            .iter()
            .map(|(metric, scope)| (*metric, select_bench(scope, &bench)))
            .collect_vec();
        if let Some(chart) = charts::bench_panel(&bench, &slices) {
            chart.write(
                &root
                    .join("panels")
                    .join(format!("{}.html", file_stem(&bench))),
            )?;
        }
    }
    Ok(())
}

fn write_chart(chart: Chart, path: PathBuf) -> Result<()> {
    log::debug!("Rendering '{}'", chart.title());
    chart.write(&path)
}

/// Writes the full report tree below `options.output_dir` and prints the
/// text summary.
pub fn report(
    observations: &[Observation],
    metrics: &[MetricSpec],
    options: &ReportOptions,
) -> Result<()> {
    let root = options.output_dir.as_path();
    let results = comparisons(observations, metrics, &options.baseline);

    for (metric, scope, _) in &results {
        write_metric_tree(root, metric, scope, &options.baseline)?;
        if let Some(chart) = charts::pivot_bar_chart(metric, &median_pivot(scope.iter().copied())) {
            write_chart(chart, root.join("pivots").join(format!("{}.html", metric.key)))?;
        }
    }
    write_panels(root, &observations.iter().collect_vec(), metrics)?;

    for (metric, scope, comparison) in &results {
        if let Some(comparison) = comparison {
            write_file(
                &root
                    .join("summaries")
                    .join(format!("OVERALL_{}.csv", metric.key)),
                &tables::overall_csv(comparison)?,
            )?;
        }
        let means = overall_means(&bench_means(scope.iter().copied()));
        write_chart(
            charts::summary_chart(metric, comparison.as_ref(), &means),
            root.join(format!("summary_{}.html", metric.key)),
        )?;
        write_chart(
            charts::detailed_chart(metric, comparison.as_ref()),
            root.join(format!("summary_{}_detailed.html", metric.key)),
        )?;
    }

    let dashboard_metrics = results
        .iter()
        .map(|(metric, _, comparison)| (*metric, comparison.as_ref()))
        .collect_vec();
    write_chart(
        charts::dashboard(&dashboard_metrics),
        root.join("summary_dashboard.html"),
    )?;

    let text = format_overall_summary(
        results
            .iter()
            .map(|(metric, _, comparison)| (metric.key.as_str(), comparison.as_ref())),
    );
    write_file(&root.join("summary.txt"), text.as_bytes())?;
    write_output(Path::new("-"), format!("{}\n", text).as_bytes())?;

    if options.per_environment {
        for env in environments(observations) {
            let env_root = root.join("envs").join(file_stem(&env));
            let env_observations = observations.iter().filter(|o| o.envid == env).collect_vec();
            for metric in metrics {
                let scope = env_observations
                    .iter()
                    .copied()
                    .filter(|o| metric.matches(o))
                    .collect_vec();
                write_metric_tree(&env_root, metric, &scope, &options.baseline)?;
            }
            write_panels(&env_root, &env_observations, metrics)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::defaults::builtin_metrics;
    use crate::test_helpers::{observation, synthetic_observations};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reporter_factory_extensions() {
        for name in ["-", "out.txt", "out.csv", "out.html", "OUT.HTML"] {
            assert!(
                ReporterFactory::from_file_name(Path::new(name)).is_some(),
                "{}",
                name
            );
        }
        assert!(ReporterFactory::from_file_name(Path::new("out.json")).is_none());
        assert!(ReporterFactory::from_file_name(Path::new("out")).is_none());
    }

    #[test]
    fn compare_to_files() {
        let dir = tempdir().unwrap();
        let observations = vec![observation("A", "X", 10.0), observation("A", "base", 20.0)];
        let metrics = builtin_metrics();

        let csv_path = dir.path().join("ranking.csv");
        compare(&observations, &metrics, "base", &csv_path).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("metric,rank,exe,"));
        assert!(csv.contains("time_ms,1,X,2.0,2.0,1.0"));
        assert!(!csv.contains("bytes,"));

        let txt_path = dir.path().join("ranking.txt");
        compare(&observations, &metrics, "base", &txt_path).unwrap();
        let txt = fs::read_to_string(&txt_path).unwrap();
        assert!(txt.contains("=== OVERALL PERFORMANCE | time_ms ==="));
        assert!(txt.contains("=== OVERALL PERFORMANCE | gc_count ===\n(no result)"));

        let html_path = dir.path().join("ranking.html");
        compare(&observations, &metrics, "base", &html_path).unwrap();
        assert!(fs::read_to_string(&html_path).unwrap().contains("bytes: (no data)"));

        assert!(compare(&observations, &metrics, "base", &dir.path().join("r.json")).is_err());
    }

    #[test]
    fn summary_text_covers_every_metric() {
        let observations = synthetic_observations(2, 2, 2, 2);
        let text = summary_text(&observations, &builtin_metrics());
        assert_eq!(text.matches("***** Collapsed").count(), 4);
        assert!(text.contains("median_bytes"));
    }

    #[test]
    fn report_tree() {
        let dir = tempdir().unwrap();
        let observations = synthetic_observations(2, 3, 2, 2);
        let options = ReportOptions {
            output_dir: dir.path().to_path_buf(),
            baseline: "exe-0".to_string(),
            per_environment: true,
        };
        report(&observations, &builtin_metrics(), &options).unwrap();

        let root = dir.path();
        for path in [
            "time_ms/bench-0.html",
            "bytes/bench-1.html",
            "panels/bench-0.html",
            "pivots/gc_count.html",
            "summaries/time_ms/bench-0.csv",
            "summaries/MASTER_gc_time_ms.csv",
            "summaries/OVERALL_time_ms.csv",
            "summary.txt",
            "summary_time_ms.html",
            "summary_time_ms_detailed.html",
            "summary_dashboard.html",
            "envs/0/time_ms/bench-0.html",
            "envs/1/panels/bench-1.html",
            "envs/1/summaries/MASTER_bytes.csv",
        ] {
            assert!(root.join(path).is_file(), "missing {}", path);
        }
        let summary = fs::read_to_string(root.join("summary.txt")).unwrap();
        assert_eq!(summary.matches("(baseline)").count(), 4);
    }

    #[test]
    fn report_without_baseline_observations() {
        let dir = tempdir().unwrap();
        let observations = synthetic_observations(2, 2, 1, 2);
        let options = ReportOptions {
            output_dir: dir.path().to_path_buf(),
            baseline: "missing".to_string(),
            per_environment: false,
        };
        report(&observations, &builtin_metrics(), &options).unwrap();

        assert!(!dir.path().join("summaries/OVERALL_time_ms.csv").exists());
        assert!(!dir.path().join("envs").exists());
        assert!(dir.path().join("time_ms/bench-0.html").is_file());
        let summary = fs::read_to_string(dir.path().join("summary.txt")).unwrap();
        assert_eq!(summary.matches("(no result)").count(), 4);
        let placeholder = fs::read_to_string(dir.path().join("summary_bytes.html")).unwrap();
        assert!(placeholder.contains("No data for bytes"));
    }
}
