//! Centralized default values for bench-report configuration.
//!
//! These defaults are used as fallback values when neither the command line
//! nor a configuration file provides a setting.

use crate::data::MetricSpec;

/// Name of the repository/project local configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".benchreportconfig";

/// Directory below `$XDG_CONFIG_HOME` (or `~/.config`) holding `config.toml`.
pub const SYSTEM_CONFIG_DIR: &str = "bench-report";

/// Root directory of the report tree when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "bench-report";

/// Decimal places for metrics declared in the configuration without `precision`.
pub const DEFAULT_PRECISION: usize = 2;

/// The metrics reported out of the box, in report order.
///
/// | key          | criterion   | unit    |
/// |--------------|-------------|---------|
/// | `time_ms`    | `total`     | `ms`    |
/// | `bytes`      | `Allocated` | `bytes` |
/// | `gc_time_ms` | `GC time`   | `ms`    |
/// | `gc_count`   | `GC count`  | `n`     |
pub fn builtin_metrics() -> Vec<MetricSpec> {
    [
        ("time_ms", "total", "ms", "Execution time (ms)", "Total time", 2),
        ("bytes", "Allocated", "bytes", "Allocated (bytes)", "Allocated bytes", 0),
        ("gc_time_ms", "GC time", "ms", "GC time (ms)", "GC time", 2),
        ("gc_count", "GC count", "n", "GC count (n)", "GC count", 0),
    ]
    .into_iter()
    .map(|(key, criterion, unit, label, title, precision)| MetricSpec {
        key: key.to_string(),
        criterion: criterion.to_string(),
        unit: unit.to_string(),
        label: label.to_string(),
        title: title.to_string(),
        precision,
    })
    .collect()
}
