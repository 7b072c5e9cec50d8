use itertools::Itertools;

use crate::{
    aggregate::{CollapsedMedian, Pivot},
    compare::Comparison,
    data::MetricSpec,
    units::humanize,
};

/// Ranking block of one metric, as printed and written to `summary.txt`.
pub fn format_overall_block(metric: &str, comparison: Option<&Comparison>) -> String {
    let header = format!("=== OVERALL PERFORMANCE | {} ===", metric);
    let Some(comparison) = comparison.filter(|c| !c.ranking.is_empty()) else {
        return format!("{}\n(no result)\n", header);
    };

    let mut lines = vec![header];
    for r in &comparison.ranking {
        let star = if comparison.is_baseline(&r.exe) {
            "   (baseline)"
        } else {
            ""
        };
        lines.push(format!(
            " {:>2}. {:<24} gmean (x) vs base: {:6.3} | median (x): {:6.3} | best (winning) rate: {:6.1}% {}",
            r.rank,
            r.exe,
            r.geo_mean_speedup,
            r.median_speedup,
            r.win_rate * 100.0,
            star
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// All ranking blocks, in metric order.
pub fn format_overall_summary<'a>(
    blocks: impl IntoIterator<Item = (&'a str, Option<&'a Comparison>)>,
) -> String {
    blocks
        .into_iter()
        .map(|(metric, comparison)| format_overall_block(metric, comparison))
        .join("\n")
}

/// Right aligned plain text table.
fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect_vec();

    std::iter::once(header)
        .chain(rows.iter().map(|r| r.as_slice()))
        .map(|cells| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = width))
                .join(" ")
        })
        .join("\n")
}

/// The two pass median table of one metric.
pub fn format_collapsed_table(metric: &MetricSpec, rows: &[CollapsedMedian]) -> String {
    let title = format!("***** Collapsed {} summary (per bench/exe/suite/inputsize) *****", metric.key);
    if rows.is_empty() {
        return format!("{}\n(no data)\n", title);
    }
    let header = ["suite", "bench", "inputsize", "exe"]
        .iter()
        .map(|s| s.to_string())
        .chain([format!("median_{}", metric.unit), "human".to_string()])
        .collect_vec();
    let body = rows
        .iter()
        .map(|r| {
            vec![
                r.suite.clone(),
                r.bench.clone(),
                r.inputsize.map_or("-".to_string(), |i| i.to_string()),
                r.exe.clone(),
                format!("{:.prec$}", r.median, prec = metric.precision),
                humanize(r.median, &metric.unit),
            ]
        })
        .collect_vec();
    format!("{}\n{}\n", title, render_table(&header, &body))
}

/// Median per bench (rows) and exe (columns). Missing cells print as `-`.
pub fn format_pivot_table(metric: &MetricSpec, pivot: &Pivot) -> String {
    let title = format!("***** {} median per bench and exe *****", metric.label);
    if pivot.is_empty() {
        return format!("{}\n(no data)\n", title);
    }
    let header = std::iter::once("bench".to_string())
        .chain(pivot.exes.iter().cloned())
        .collect_vec();
    let body = pivot
        .benches
        .iter()
        .map(|bench| {
            std::iter::once(bench.clone())
                .chain(pivot.exes.iter().map(|exe| {
                    pivot
                        .get(bench, exe)
                        .map_or("-".to_string(), |v| {
                            format!("{:.prec$}", v, prec = metric.precision)
                        })
                }))
                .collect_vec()
        })
        .collect_vec();
    format!("{}\n{}\n", title, render_table(&header, &body))
}
