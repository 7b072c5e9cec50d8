use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{find_config_path, read_hierarchical_config, system_config_path, ReportSettings};
use crate::data::MetricSpec;

/// Configuration file sources
#[derive(Debug)]
pub struct ConfigSources {
    /// System-wide config path (if exists)
    pub system_config: Option<PathBuf>,

    /// Closest local config path (if exists)
    pub local_config: Option<PathBuf>,
}

/// Complete configuration information
#[derive(Debug)]
pub struct ConfigInfo {
    pub config_sources: ConfigSources,

    /// Effective settings, or the error preventing them from being read
    pub settings: Result<ReportSettings, String>,
}

fn gather_config_sources() -> ConfigSources {
    ConfigSources {
        system_config: system_config_path().filter(|p| p.is_file()),
        local_config: find_config_path(),
    }
}

fn gather_settings() -> Result<ReportSettings, String> {
    let config = read_hierarchical_config().map_err(|e| e.to_string())?;
    ReportSettings::from_config(&config).map_err(|e| format!("{:#}", e))
}

pub fn gather_config_info() -> ConfigInfo {
    ConfigInfo {
        config_sources: gather_config_sources(),
        settings: gather_settings(),
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or("(not found)".to_string(), |p| p.display().to_string())
}

fn display_metric(out: &mut String, metric: &MetricSpec) -> std::fmt::Result {
    writeln!(
        out,
        "  {:<12} criterion: {:<12} unit: {:<6} precision: {}  label: {}  title: {}",
        metric.key, metric.criterion, metric.unit, metric.precision, metric.label, metric.title
    )
}

/// Human readable rendering of the configuration information.
pub fn display_human_readable(info: &ConfigInfo) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Bench Report Configuration Information")?;
    writeln!(out, "======================================")?;
    writeln!(
        out,
        "System config: {}",
        display_path(info.config_sources.system_config.as_deref())
    )?;
    writeln!(
        out,
        "Local config: {}",
        display_path(info.config_sources.local_config.as_deref())
    )?;

    match &info.settings {
        Ok(settings) => {
            writeln!(out)?;
            writeln!(
                out,
                "Baseline: {}",
                settings.baseline.as_deref().unwrap_or("(not set)")
            )?;
            writeln!(out, "Output directory: {}", settings.output_dir.display())?;
            if settings.exclude_suites.is_empty() {
                writeln!(out, "Excluded suites: (none)")?;
            } else {
                writeln!(out, "Excluded suites: {}", settings.exclude_suites.join(", "))?;
            }
            writeln!(out, "Metrics:")?;
            for metric in &settings.metrics {
                display_metric(&mut out, metric)?;
            }
        }
        Err(e) => {
            writeln!(out)?;
            writeln!(out, "Configuration: Error loading - {}", e)?;
        }
    }
    Ok(out)
}

/// Show the configuration files in use and the effective settings
pub fn show_config_info() -> Result<()> {
    let info = gather_config_info();
    print!("{}", display_human_readable(&info)?);
    if let Err(e) = &info.settings {
        anyhow::bail!("Invalid configuration: {}", e);
    }
    Ok(())
}
