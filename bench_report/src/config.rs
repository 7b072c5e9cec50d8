use anyhow::{bail, Result};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};

use crate::{
    data::MetricSpec,
    defaults::{
        builtin_metrics, DEFAULT_OUTPUT_DIR, DEFAULT_PRECISION, LOCAL_CONFIG_FILE,
        SYSTEM_CONFIG_DIR,
    },
};

/// System-wide config (XDG_CONFIG_HOME or ~/.config/bench-report/config.toml)
pub fn system_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        return Some(
            Path::new(&xdg_config_home)
                .join(SYSTEM_CONFIG_DIR)
                .join("config.toml"),
        );
    }
    dirs_next::home_dir().map(|home| {
        home.join(".config")
            .join(SYSTEM_CONFIG_DIR)
            .join("config.toml")
    })
}

/// Closest `.benchreportconfig`, searching upward from the working directory.
pub fn find_config_path() -> Option<PathBuf> {
    let mut current_dir = env::current_dir().ok()?;
    loop {
        let candidate = current_dir.join(LOCAL_CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}

/// Read hierarchical configuration (system -> local override)
pub fn read_hierarchical_config() -> Result<Config, ConfigError> {
    let paths: Vec<PathBuf> = system_config_path()
        .into_iter()
        .chain(find_config_path())
        .collect();
    read_config_files(&paths)
}

/// Layers the given TOML files, later files overriding earlier ones.
/// Missing files are skipped.
pub fn read_config_files(paths: &[PathBuf]) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();
    for path in paths {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(false),
        );
    }
    builder.build()
}

/// A `[metric.<key>]` table. Every field overrides the built-in metric of the
/// same key; new metrics need at least `criterion` and `unit`.
#[derive(Debug, Default, Deserialize)]
struct MetricOverride {
    criterion: Option<String>,
    unit: Option<String>,
    label: Option<String>,
    title: Option<String>,
    precision: Option<usize>,
}

/// Effective settings of a run, before command line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub baseline: Option<String>,
    pub output_dir: PathBuf,
    pub exclude_suites: Vec<String>,
    pub metrics: Vec<MetricSpec>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            baseline: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            exclude_suites: Vec::new(),
            metrics: builtin_metrics(),
        }
    }
}

fn unreadable_config_warning(e: &ConfigError) -> String {
    format!(
        "Could not read configuration, using defaults: {}. Run `bench-report config` for details",
        e
    )
}

impl ReportSettings {
    /// Settings from the hierarchical configuration.
    /// Unreadable configuration is logged and replaced by the defaults.
    pub fn load() -> Result<ReportSettings> {
        ReportSettings::from_config_or_defaults(read_hierarchical_config())
    }

    fn from_config_or_defaults(config: Result<Config, ConfigError>) -> Result<ReportSettings> {
        match config {
            Ok(config) => ReportSettings::from_config(&config),
            Err(e) => {
                log::warn!("{}", unreadable_config_warning(&e));
                Ok(ReportSettings::default())
            }
        }
    }

    pub fn from_config(config: &Config) -> Result<ReportSettings> {
        let defaults = ReportSettings::default();

        let overrides = match config.get::<BTreeMap<String, MetricOverride>>("metric") {
            Ok(overrides) => overrides,
            Err(ConfigError::NotFound(_)) => BTreeMap::new(),
            Err(e) => bail!("Invalid metric configuration: {}", e),
        };

        Ok(ReportSettings {
            baseline: config.get_string("report.baseline").ok(),
            output_dir: config
                .get_string("report.output_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            exclude_suites: config
                .get::<Vec<String>>("report.exclude_suites")
                .unwrap_or_default(),
            metrics: merge_metrics(defaults.metrics, overrides)?,
        })
    }

    /// Restricts the metrics to the given keys, keeping report order.
    /// An empty selection keeps all metrics.
    pub fn select_metrics(&self, keys: &[String]) -> Result<Vec<MetricSpec>> {
        if let Some(unknown) = keys
            .iter()
            .find(|k| !self.metrics.iter().any(|m| &m.key == *k))
        {
            bail!(
                "Unknown metric '{}'. Known metrics: {}",
                unknown,
                self.metrics
                    .iter()
                    .map(|m| m.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(self
            .metrics
            .iter()
            .filter(|m| keys.is_empty() || keys.contains(&m.key))
            .cloned()
            .collect())
    }
}

fn merge_metrics(
    mut metrics: Vec<MetricSpec>,
    overrides: BTreeMap<String, MetricOverride>,
) -> Result<Vec<MetricSpec>> {
    for (key, o) in overrides {
        if let Some(existing) = metrics.iter_mut().find(|m| m.key == key) {
            if let Some(criterion) = o.criterion {
                existing.criterion = criterion;
            }
            if let Some(unit) = o.unit {
                existing.unit = unit;
            }
            if let Some(label) = o.label {
                existing.label = label;
            }
            if let Some(title) = o.title {
                existing.title = title;
            }
            if let Some(precision) = o.precision {
                existing.precision = precision;
            }
            continue;
        }

        let (Some(criterion), Some(unit)) = (o.criterion, o.unit) else {
            bail!(
                "Metric '{}' needs both 'criterion' and 'unit' to be configured",
                key
            );
        };
        metrics.push(MetricSpec {
            label: o.label.unwrap_or_else(|| format!("{} ({})", criterion, unit)),
            title: o.title.unwrap_or_else(|| criterion.clone()),
            precision: o.precision.unwrap_or(DEFAULT_PRECISION),
            key,
            criterion,
            unit,
        });
    }
    Ok(metrics)
}
