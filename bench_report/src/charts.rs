use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use itertools::Itertools;
use plotly::{
    box_plot::BoxPoints,
    common::{Anchor, DashType, Marker, Mode, Orientation, Position, TextPosition, Title},
    layout::{
        Annotation, Axis, BarMode, GridPattern, LayoutGrid, Shape, ShapeLine, ShapeType,
    },
    Bar, BoxPlot, Configuration, Layout, Plot, Scatter,
};

use crate::{
    aggregate::{self, Pivot},
    compare::Comparison,
    data::{MetricSpec, Observation},
    stats::Stats,
    tables::write_file,
    units::humanize,
};

/// plotly-rs exposes dedicated layout setters for the first eight axes only.
pub const MAX_SUBPLOTS: usize = 8;

const BASELINE_LINE_COLOR: &str = "gray";
const BASELINE_LINE_WIDTH: f64 = 1.0;
const MEAN_MARKER_COLOR: &str = "black";

#[cfg(feature = "static-images")]
const IMAGE_WIDTH: usize = 1200;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{TITLE}}</title>
    {{PLOTLY_HEAD}}
</head>
<body>
    {{PLOTLY_BODY}}
    <p style="font-family: sans-serif; font-size: small; color: #444">Generated {{TIMESTAMP}}</p>
</body>
</html>"#;

/// A rendered chart together with its page title.
pub struct Chart {
    title: String,
    plot: Plot,
    #[cfg(feature = "static-images")]
    height: usize,
}

impl Chart {
    fn new(title: impl Into<String>, layout: Layout, height: usize) -> Chart {
        let mut plot = Plot::new();
        plot.set_configuration(Configuration::default().responsive(true).fill_frame(false));
        plot.set_layout(layout.height(height));
        Chart {
            title: title.into(),
            plot,
            #[cfg(feature = "static-images")]
            height,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Self-contained HTML page, loading Plotly.js from the CDN.
    pub fn to_html(&self) -> Vec<u8> {
        HTML_TEMPLATE
            .replace("{{TITLE}}", &self.title)
            .replace("{{PLOTLY_HEAD}}", &Plot::online_cdn_js())
            .replace("{{PLOTLY_BODY}}", &self.plot.to_inline_html(None))
            .replace(
                "{{TIMESTAMP}}",
                &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            )
            .into_bytes()
    }

    /// Writes `<path>` as HTML and, with static images enabled, a PNG next to it.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_file(path, &self.to_html())?;
        #[cfg(feature = "static-images")]
        self.plot.write_image(
            path.with_extension("png"),
            plotly::ImageFormat::PNG,
            IMAGE_WIDTH,
            self.height,
            2.0,
        );
        Ok(())
    }
}

fn axis_ids(index: usize) -> (String, String) {
    if index == 0 {
        ("x".to_string(), "y".to_string())
    } else {
        (format!("x{}", index + 1), format!("y{}", index + 1))
    }
}

fn with_axes(layout: Layout, index: usize, x: Axis, y: Axis) -> Layout {
    match index {
        0 => layout.x_axis(x).y_axis(y),
        1 => layout.x_axis2(x).y_axis2(y),
        2 => layout.x_axis3(x).y_axis3(y),
        3 => layout.x_axis4(x).y_axis4(y),
        4 => layout.x_axis5(x).y_axis5(y),
        5 => layout.x_axis6(x).y_axis6(y),
        6 => layout.x_axis7(x).y_axis7(y),
        7 => layout.x_axis8(x).y_axis8(y),
        _ => layout,
    }
}

fn grid(rows: usize, columns: usize) -> LayoutGrid {
    LayoutGrid::new()
        .rows(rows)
        .columns(columns)
        .pattern(GridPattern::Independent)
}

fn hidden_axis() -> Axis {
    Axis::new()
        .visible(false)
        .show_grid(false)
        .zero_line(false)
}

/// A centered text in place of a plot.
fn text_trace(text: &str, index: usize) -> Box<Scatter<f64, f64>> {
    let (x_id, y_id) = axis_ids(index);
    Scatter::new(vec![0.0], vec![0.0])
        .mode(Mode::Text)
        .text_array(vec![text.to_string()])
        .text_position(Position::MiddleCenter)
        .x_axis(&x_id)
        .y_axis(&y_id)
        .show_legend(false)
}

fn format_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}x", value)
    } else {
        "n/a".to_string()
    }
}

fn format_pct_vs_baseline(pct: f64) -> String {
    if !pct.is_finite() {
        return String::new();
    }
    let sign = if pct >= 0.0 { "+" } else { "-" };
    format!(" ({}{:.1}% vs base)", sign, pct.abs() * 100.0)
}

fn values_of(observations: &[&Observation], exe: &str) -> Vec<f64> {
    observations
        .iter()
        .filter(|o| o.exe == exe)
        .filter_map(|o| o.value)
        .collect()
}

fn environments_label(observations: &[&Observation]) -> String {
    crate::filter::environments(observations.iter().copied()).join(", ")
}

/// Horizontal boxes (whiskers at min/max, no points) for the given exe order,
/// plus a marker at every mean labelled by `label`.
fn add_boxes<F>(
    plot: &mut Plot,
    observations: &[&Observation],
    exe_order: &[String],
    index: usize,
    metric: &MetricSpec,
    label: F,
) where
    F: Fn(&str, f64) -> String,
{
    let (x_id, y_id) = axis_ids(index);
    let mut means = Vec::new();
    let mut exes = Vec::new();
    let mut labels = Vec::new();
    let mut hovers = Vec::new();

    // Plotly stacks categories bottom-up; the first exe should end up on top.
    for exe in exe_order.iter().rev() {
        let values = values_of(observations, exe);
        let Some(stats) = Stats::from_values(values.iter().copied()) else {
            continue;
        };
        let trace = BoxPlot::new_xy(values.clone(), vec![exe.clone(); values.len()])
            .name(exe)
            .orientation(Orientation::Horizontal)
            .box_points(BoxPoints::False)
            .x_axis(&x_id)
            .y_axis(&y_id)
            .show_legend(false);
        plot.add_trace(trace);
        means.push(stats.mean);
        exes.push(exe.clone());
        labels.push(label(exe, stats.mean));
        hovers.push(format!("{}: mean {}", exe, humanize(stats.mean, &metric.unit)));
    }

    plot.add_trace(
        Scatter::new(means, exes)
            .mode(Mode::MarkersText)
            .text_array(labels)
            .text_position(Position::TopRight)
            .hover_text_array(hovers)
            .marker(Marker::new().color(MEAN_MARKER_COLOR).size(7))
            .name("mean")
            .x_axis(&x_id)
            .y_axis(&y_id)
            .show_legend(false),
    );
}

/// Dashed vertical line at the baseline mean across the whole plot height,
/// labelled above the plot area.
fn baseline_marker(mean: f64, metric: &MetricSpec) -> (Shape, Annotation) {
    let line = Shape::new()
        .shape_type(ShapeType::Line)
        .x_ref("x")
        .y_ref("paper")
        .x0(mean)
        .x1(mean)
        .y0(0.0)
        .y1(1.0)
        .line(
            ShapeLine::new()
                .color(BASELINE_LINE_COLOR)
                .width(BASELINE_LINE_WIDTH)
                .dash(DashType::Dash),
        );
    let label = Annotation::new()
        .text(format!("Baseline mean: {}", metric.format_value(mean)))
        .x_ref("x")
        .y_ref("paper")
        .x(mean)
        .y(1.0)
        .x_anchor(Anchor::Left)
        .y_anchor(Anchor::Bottom)
        .show_arrow(false);
    (line, label)
}

/// Box plot of one benchmark, one box per exe ordered by ascending mean.
///
/// Returns `None` if the benchmark has no values.
pub fn bench_box_plot(
    metric: &MetricSpec,
    bench: &str,
    observations: &[&Observation],
    baseline: Option<&str>,
) -> Option<Chart> {
    let summary = aggregate::bench_summary(observations, baseline.unwrap_or_default());
    let best = summary.first()?;
    let exe_order = summary.iter().map(|s| s.exe.clone()).collect_vec();
    let pct_by_exe: BTreeMap<&str, f64> = summary
        .iter()
        .map(|s| (s.exe.as_str(), s.pct_vs_baseline))
        .collect();

    let range = Stats::from_values(observations.iter().filter_map(|o| o.value))?;
    let title = format!("{} | Environment(s): {}", bench, environments_label(observations));
    let footer = format!(
        "Best mean: {} - Range: {}-{}",
        best.exe,
        metric.format_value(range.min),
        metric.format_value(range.max)
    );

    let height = (80 * exe_order.len() + 200).max(320);
    let mut layout = Layout::new()
        .title(Title::from(format!("{}<br><sub>{}</sub>", title, footer)))
        .x_axis(Axis::new().title(Title::from(metric.label.as_str())))
        .y_axis(
            Axis::new()
                .title(Title::from("Interpreter"))
                .auto_margin(true),
        )
        .show_legend(false);
    if let Some(base) = baseline.and_then(|b| summary.iter().find(|s| s.exe == b)) {
        let (line, label) = baseline_marker(base.stats.mean, metric);
        layout = layout.shapes(vec![line]).annotations(vec![label]);
    }
    let mut chart = Chart::new(title, layout, height);

    add_boxes(
        &mut chart.plot,
        observations,
        &exe_order,
        0,
        metric,
        |exe, mean| {
            format!(
                "{}{}",
                metric.format_value(mean),
                format_pct_vs_baseline(pct_by_exe.get(exe).copied().unwrap_or(f64::NAN))
            )
        },
    );

    Some(chart)
}

/// One box plot subplot per metric that has data for `bench`.
///
/// The exe order is taken from `time_ms` when present, otherwise from the
/// first metric with data.
pub fn bench_panel(bench: &str, slices: &[(&MetricSpec, Vec<&Observation>)]) -> Option<Chart> {
    let mut slices = slices
        .iter()
        .filter(|(_, observations)| observations.iter().any(|o| o.value.is_some()))
        .collect_vec();
    if slices.len() > MAX_SUBPLOTS {
        log::warn!(
            "Panel of {} shows the first {} of {} metrics",
            bench,
            MAX_SUBPLOTS,
            slices.len()
        );
        slices.truncate(MAX_SUBPLOTS);
    }
    let (_, order_source) = slices
        .iter()
        .find(|(metric, _)| metric.key == "time_ms")
        .or_else(|| slices.first())?;
    let exe_order = aggregate::exe_order_by_mean(order_source);

    let all_observations = slices
        .iter()
        .flat_map(|(_, observations)| observations.iter().copied())
        .collect_vec();
    let title = format!("{} | Environment(s): {}", bench, environments_label(&all_observations));

    let columns = if slices.len() > 1 { 2 } else { 1 };
    let rows = slices.len().div_ceil(columns);
    let mut layout = Layout::new()
        .title(Title::from(title.as_str()))
        .grid(grid(rows, columns))
        .show_legend(false);
    for (index, (metric, _)) in slices.iter().enumerate() {
        layout = with_axes(
            layout,
            index,
            Axis::new().title(Title::from(format!("{} | {}", metric.title, metric.label))),
            Axis::new().auto_margin(true),
        );
    }

    let height = rows * (60 * exe_order.len() + 160).max(300);
    let mut chart = Chart::new(title, layout, height);
    for (index, (metric, observations)) in slices.iter().enumerate() {
        add_boxes(
            &mut chart.plot,
            observations,
            &exe_order,
            index,
            metric,
            |_, mean| metric.format_value(mean),
        );
    }
    Some(chart)
}

/// Grouped bars of the bench x exe median table.
pub fn pivot_bar_chart(metric: &MetricSpec, pivot: &Pivot) -> Option<Chart> {
    if pivot.is_empty() {
        return None;
    }
    let layout = Layout::new()
        .title(Title::from(metric.label.as_str()))
        .bar_mode(BarMode::Group)
        .x_axis(Axis::new().title(Title::from("Benchmark")).auto_margin(true))
        .y_axis(Axis::new().title(Title::from(format!("median ({})", metric.unit))));
    let mut chart = Chart::new(format!("{} per benchmark", metric.label), layout, 600);
    for exe in &pivot.exes {
        let medians = pivot
            .benches
            .iter()
            .map(|bench| pivot.get(bench, exe))
            .collect_vec();
        chart
            .plot
            .add_trace(Bar::new(pivot.benches.clone(), medians).name(exe));
    }
    Some(chart)
}

/// Horizontal bars in subplot `index`, best value on top.
fn ranking_bars(
    exes: &[String],
    values: Vec<f64>,
    labels: Vec<String>,
    index: usize,
) -> Box<Bar<f64, String>> {
    let (x_id, y_id) = axis_ids(index);
    Bar::new(values, exes.to_vec())
        .orientation(Orientation::Horizontal)
        .text_array(labels)
        .text_position(TextPosition::Outside)
        .x_axis(&x_id)
        .y_axis(&y_id)
        .show_legend(false)
}

/// Rankings sorted by ascending geometric mean speedup, so that bars of
/// the best configuration are drawn on top.
fn ascending_by_gmean(comparison: &Comparison) -> Vec<&crate::compare::Ranking> {
    comparison
        .ranking
        .iter()
        .sorted_by(|a, b| a.geo_mean_speedup.total_cmp(&b.geo_mean_speedup))
        .collect()
}

/// Placeholder page for a metric without comparison.
pub fn placeholder(metric: &str) -> Chart {
    let text = format!("No data for {}", metric);
    let layout = Layout::new()
        .title(Title::from(text.as_str()))
        .x_axis(hidden_axis())
        .y_axis(hidden_axis());
    let mut chart = Chart::new(text.clone(), layout, 300);
    chart.plot.add_trace(text_trace(&text, 0));
    chart
}

/// Geometric mean speedup, win rate and the overall raw mean per exe.
pub fn summary_chart(
    metric: &MetricSpec,
    comparison: Option<&Comparison>,
    overall_means: &BTreeMap<String, f64>,
) -> Chart {
    let Some(comparison) = comparison else {
        return placeholder(&metric.key);
    };
    let ranking = ascending_by_gmean(comparison);
    let exes = ranking.iter().map(|r| r.exe.clone()).collect_vec();

    let title = format!("{} | {}", metric.key, metric.title);
    let layout = with_axes(
        with_axes(
            with_axes(
                Layout::new()
                    .title(Title::from(title.as_str()))
                    .grid(grid(3, 1))
                    .show_legend(false),
                0,
                Axis::new().title(Title::from(
                    "Geometric mean speedup vs baseline (x) | higher is better",
                )),
                Axis::new().auto_margin(true),
            ),
            1,
            Axis::new().title(Title::from(
                "Winning rate across benches (%) | higher is better",
            )),
            Axis::new().auto_margin(true),
        ),
        2,
        Axis::new().title(Title::from(format!(
            "Overall mean (of bench means) by interpreter | {}",
            metric.unit
        ))),
        Axis::new().auto_margin(true),
    );
    let height = 3 * (40 * exes.len() + 120).max(220);
    let mut chart = Chart::new(title, layout, height);

    chart.plot.add_trace(ranking_bars(
        &exes,
        ranking.iter().map(|r| r.geo_mean_speedup).collect(),
        ranking.iter().map(|r| format_ratio(r.geo_mean_speedup)).collect(),
        0,
    ));
    chart.plot.add_trace(ranking_bars(
        &exes,
        ranking.iter().map(|r| r.win_rate * 100.0).collect(),
        ranking
            .iter()
            .map(|r| format!("{:.1}%", r.win_rate * 100.0))
            .collect(),
        1,
    ));

    let means = exes
        .iter()
        .map(|exe| overall_means.get(exe).copied().unwrap_or(f64::NAN))
        .collect_vec();
    let labels = means
        .iter()
        .map(|m| {
            if m.is_finite() {
                format!("{} ({})", metric.format_value(*m), humanize(*m, &metric.unit))
            } else {
                "n/a".to_string()
            }
        })
        .collect_vec();
    chart.plot.add_trace(ranking_bars(&exes, means, labels, 2));
    chart
}

/// Geometric mean and median speedup bars plus the distribution of the
/// per benchmark speedups of every exe.
pub fn detailed_chart(metric: &MetricSpec, comparison: Option<&Comparison>) -> Chart {
    let Some(comparison) = comparison else {
        return placeholder(&metric.key);
    };
    let ranking = ascending_by_gmean(comparison);
    let exes = ranking.iter().map(|r| r.exe.clone()).collect_vec();

    let title = format!("{} | {} (detailed)", metric.key, metric.title);
    let layout = with_axes(
        with_axes(
            with_axes(
                Layout::new()
                    .title(Title::from(title.as_str()))
                    .grid(grid(3, 1))
                    .show_legend(false),
                0,
                Axis::new().title(Title::from(
                    "Geometric mean speedup vs baseline (x) | higher is better",
                )),
                Axis::new().auto_margin(true),
            ),
            1,
            Axis::new().title(Title::from(
                "Median speedup vs baseline (x) | higher is better",
            )),
            Axis::new().auto_margin(true),
        ),
        2,
        Axis::new().title(Title::from("Per-benchmark speedup vs baseline (x)")),
        Axis::new().auto_margin(true),
    );
    let height = 3 * (40 * exes.len() + 120).max(240);
    let mut chart = Chart::new(title, layout, height);

    chart.plot.add_trace(ranking_bars(
        &exes,
        ranking.iter().map(|r| r.geo_mean_speedup).collect(),
        ranking.iter().map(|r| format_ratio(r.geo_mean_speedup)).collect(),
        0,
    ));
    chart.plot.add_trace(ranking_bars(
        &exes,
        ranking.iter().map(|r| r.median_speedup).collect(),
        ranking.iter().map(|r| format_ratio(r.median_speedup)).collect(),
        1,
    ));

    let (x_id, y_id) = axis_ids(2);
    let mut maxima = Vec::new();
    let mut labelled = Vec::new();
    let mut labels = Vec::new();
    for exe in &exes {
        let speedups = comparison.speedups_of(exe);
        let Some(stats) = Stats::from_values(speedups.iter().copied()) else {
            continue;
        };
        chart.plot.add_trace(
            BoxPlot::new_xy(speedups.clone(), vec![exe.clone(); speedups.len()])
                .name(exe)
                .orientation(Orientation::Horizontal)
                .box_points(BoxPoints::False)
                .x_axis(&x_id)
                .y_axis(&y_id)
                .show_legend(false),
        );
        maxima.push(stats.max);
        labelled.push(exe.clone());
        labels.push(format!(
            "min={:.3}x mean={:.3}x median={:.3}x max={:.3}x",
            stats.min, stats.mean, stats.median, stats.max
        ));
    }
    chart.plot.add_trace(
        Scatter::new(maxima, labelled)
            .mode(Mode::Text)
            .text_array(labels)
            .text_position(Position::MiddleRight)
            .x_axis(&x_id)
            .y_axis(&y_id)
            .show_legend(false),
    );
    chart
}

/// Geometric mean speedup of every metric, one subplot each.
pub fn dashboard(metrics: &[(&MetricSpec, Option<&Comparison>)]) -> Chart {
    if metrics.len() > MAX_SUBPLOTS {
        log::warn!(
            "Dashboard shows the first {} of {} metrics",
            MAX_SUBPLOTS,
            metrics.len()
        );
    }
    let metrics = &metrics[..metrics.len().min(MAX_SUBPLOTS)];

    let title = "Overall speedup vs baseline (geometric mean)";
    let mut layout = Layout::new()
        .title(Title::from(title))
        .grid(grid(metrics.len().max(1), 1))
        .show_legend(false);
    for (index, (metric, comparison)) in metrics.iter().enumerate() {
        let (x, y) = match comparison {
            Some(_) => (
                Axis::new().title(Title::from(format!(
                    "{} | geometric mean speedup (x)",
                    metric.key
                ))),
                Axis::new().auto_margin(true),
            ),
            None => (hidden_axis(), hidden_axis()),
        };
        layout = with_axes(layout, index, x, y);
    }

    let rows = metrics
        .iter()
        .map(|(_, c)| c.map_or(1, |c| c.ranking.len()))
        .max()
        .unwrap_or(1);
    let height = metrics.len().max(1) * (40 * rows + 120).max(220);
    let mut chart = Chart::new(title, layout, height);

    for (index, (metric, comparison)) in metrics.iter().enumerate() {
        match comparison {
            Some(comparison) => {
                let ranking = ascending_by_gmean(comparison);
                let exes = ranking.iter().map(|r| r.exe.clone()).collect_vec();
                chart.plot.add_trace(
                    ranking_bars(
                        &exes,
                        ranking.iter().map(|r| r.geo_mean_speedup).collect(),
                        ranking.iter().map(|r| format_ratio(r.geo_mean_speedup)).collect(),
                        index,
                    )
                    .name(&metric.key),
                );
            }
            None => chart
                .plot
                .add_trace(text_trace(&format!("{}: (no data)", metric.key), index)),
        }
    }
    chart
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compare::compare_observations;
    use crate::defaults::builtin_metrics;
    use crate::test_helpers::{metric_observation, observation};

    fn html(chart: &Chart) -> String {
        String::from_utf8(chart.to_html()).unwrap()
    }

    #[test]
    fn box_plot_page() {
        let metric = &builtin_metrics()[0];
        let observations = vec![
            observation("Bounce", "base", 20.0),
            observation("Bounce", "base", 22.0),
            observation("Bounce", "fast", 10.0),
        ];
        let refs = observations.iter().collect_vec();
        let chart = bench_box_plot(metric, "Bounce", &refs, Some("base")).unwrap();
        assert_eq!(chart.title(), "Bounce | Environment(s): 1");

        let page = html(&chart);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Bounce | Environment(s): 1</title>"));
        assert!(page.contains("plotly"));
        assert!(page.contains("Best mean: fast"));
        assert!(page.contains("Baseline mean: 21.00 ms"));
        assert!(page.contains("vs base"));
    }

    #[test]
    fn baseline_line_with_single_exe() {
        let metric = &builtin_metrics()[0];
        let observations = vec![
            observation("Bounce", "base", 20.0),
            observation("Bounce", "base", 22.0),
        ];
        let refs = observations.iter().collect_vec();
        let chart = bench_box_plot(metric, "Bounce", &refs, Some("base")).unwrap();

        let layout = serde_json::to_value(chart.plot.layout()).unwrap();
        let shape = &layout["shapes"][0];
        assert_eq!(shape["type"], "line");
        assert_eq!(shape["x0"], 21.0);
        assert_eq!(shape["x1"], 21.0);
        assert_eq!(shape["yref"], "paper");
        assert_eq!(shape["y0"], 0.0);
        assert_eq!(shape["y1"], 1.0);
        assert_eq!(shape["line"]["dash"], "dash");
        assert_eq!(layout["annotations"][0]["text"], "Baseline mean: 21.00 ms");
        assert_eq!(layout["annotations"][0]["showarrow"], false);

        let without_baseline = bench_box_plot(metric, "Bounce", &refs, None).unwrap();
        let layout = serde_json::to_value(without_baseline.plot.layout()).unwrap();
        assert!(layout.get("shapes").is_none());
    }

    #[test]
    fn box_plot_without_values() {
        let metric = &builtin_metrics()[0];
        let mut missing = observation("Bounce", "base", 1.0);
        missing.value = None;
        let refs = vec![&missing];
        assert!(bench_box_plot(metric, "Bounce", &refs, Some("base")).is_none());
        assert!(bench_box_plot(metric, "Bounce", &[], None).is_none());
    }

    #[test]
    fn pct_vs_baseline_label() {
        assert_eq!(format_pct_vs_baseline(0.25), " (+25.0% vs base)");
        assert_eq!(format_pct_vs_baseline(-0.5), " (-50.0% vs base)");
        assert_eq!(format_pct_vs_baseline(f64::NAN), "");
    }

    #[test]
    fn panel_skips_metrics_without_data() {
        let metrics = builtin_metrics();
        let time = vec![observation("Bounce", "base", 20.0)];
        let gc = vec![metric_observation("Bounce", "base", "GC count", "n", 3.0)];
        let slices = vec![
            (&metrics[0], time.iter().collect_vec()),
            (&metrics[1], Vec::new()),
            (&metrics[3], gc.iter().collect_vec()),
        ];
        let chart = bench_panel("Bounce", &slices).unwrap();
        let page = html(&chart);
        assert!(page.contains("Total time | Execution time (ms)"));
        assert!(page.contains("GC count | GC count (n)"));
        assert!(!page.contains("Allocated bytes | Allocated (bytes)"));

        assert!(bench_panel("Bounce", &[(&metrics[1], Vec::new())]).is_none());
    }

    #[test]
    fn panel_keeps_first_subplots() {
        let metrics = (0..=MAX_SUBPLOTS)
            .map(|i| MetricSpec {
                key: format!("m{}", i),
                title: format!("Metric number {}", i),
                ..builtin_metrics()[0].clone()
            })
            .collect_vec();
        let time = vec![observation("Bounce", "base", 20.0)];
        let slices = metrics
            .iter()
            .map(|m| (m, time.iter().collect_vec()))
            .collect_vec();
        let page = html(&bench_panel("Bounce", &slices).unwrap());
        assert!(page.contains("Metric number 7 |"));
        assert!(!page.contains("Metric number 8 |"));
    }

    #[test]
    fn placeholders_for_missing_comparisons() {
        let metric = &builtin_metrics()[1];
        let chart = summary_chart(metric, None, &BTreeMap::new());
        assert_eq!(chart.title(), "No data for bytes");
        assert_eq!(detailed_chart(metric, None).title(), "No data for bytes");
    }

    #[test]
    fn summary_and_dashboard() {
        let metrics = builtin_metrics();
        let observations = vec![observation("A", "X", 10.0), observation("A", "base", 20.0)];
        let refs = observations.iter().collect_vec();
        let comparison = compare_observations(&refs, "base").unwrap();
        let means = crate::compare::overall_means(&crate::compare::bench_means(refs.clone()));

        let page = html(&summary_chart(&metrics[0], Some(&comparison), &means));
        assert!(page.contains("2.000x"));
        assert!(page.contains("100.0%"));

        let page = html(&detailed_chart(&metrics[0], Some(&comparison)));
        assert!(page.contains("min=2.000x mean=2.000x median=2.000x max=2.000x"));

        let page = html(&dashboard(&[
            (&metrics[0], Some(&comparison)),
            (&metrics[1], None),
        ]));
        assert!(page.contains("bytes: (no data)"));
        assert!(page.contains("2.000x"));
    }

    #[test]
    fn pivot_chart() {
        let metric = &builtin_metrics()[0];
        let observations = vec![
            observation("Bounce", "base", 20.0),
            observation("Sieve", "fast", 10.0),
        ];
        let pivot = aggregate::median_pivot(&observations);
        let chart = pivot_bar_chart(metric, &pivot).unwrap();
        assert_eq!(chart.title(), "Execution time (ms) per benchmark");
        assert!(pivot_bar_chart(metric, &Pivot::default()).is_none());
    }
}
