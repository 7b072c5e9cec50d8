use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::Level;

use crate::config::ReportSettings;
use crate::config_cmd::show_config_info;
use crate::data::Observation;
use crate::filter::ObservationFilter;
use crate::loader::load_observations;
use crate::reporting::{compare, report, summary, ReportOptions};
use bench_report_cli_types::{Cli, CliSelection, Commands};

pub fn handle_calls() -> Result<()> {
    let cli = Cli::parse();
    let logger_level = match cli.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(logger_level.as_str())).init();

    match cli.command {
        Commands::Summary { selection, metric } => {
            let settings = ReportSettings::load()?;
            let observations = load_selection(&selection, &settings)?;
            summary(&observations, &settings.select_metrics(&metric)?)
        }
        Commands::Compare {
            selection,
            metric,
            output,
        } => {
            let settings = ReportSettings::load()?;
            let baseline = resolve_baseline(&selection, &settings)?;
            let observations = load_selection(&selection, &settings)?;
            compare(
                &observations,
                &settings.select_metrics(&metric)?,
                &baseline,
                &output,
            )
        }
        Commands::Report {
            selection,
            output_dir,
            no_envs,
        } => {
            let settings = ReportSettings::load()?;
            let baseline = resolve_baseline(&selection, &settings)?;
            let observations = load_selection(&selection, &settings)?;
            let options = ReportOptions {
                output_dir: output_dir.unwrap_or_else(|| settings.output_dir.clone()),
                baseline,
                per_environment: !no_envs,
            };
            report(&observations, &settings.metrics, &options)
        }
        Commands::Config {} => show_config_info(),
    }
}

/// Baseline from the command line, falling back to the configuration.
fn resolve_baseline(selection: &CliSelection, settings: &ReportSettings) -> Result<String> {
    selection
        .baseline
        .clone()
        .or_else(|| settings.baseline.clone())
        .ok_or_else(|| {
            anyhow!("No baseline configured. Pass --baseline or set report.baseline in the configuration")
        })
}

/// Loads the input table and drops excluded suites and unselected rows.
/// Excluded suites of the configuration and the command line add up.
fn load_selection(selection: &CliSelection, settings: &ReportSettings) -> Result<Vec<Observation>> {
    let excluded_suites = settings
        .exclude_suites
        .iter()
        .chain(&selection.exclude_suite)
        .cloned()
        .collect();
    let filter = ObservationFilter::new(excluded_suites, &selection.filter, &selection.exe)?;

    let observations = load_observations(&selection.input)
        .with_context(|| format!("Failed to load {}", selection.input.display()))?;
    log::info!(
        "Loaded {} observations from {}",
        observations.len(),
        selection.input.display()
    );
    Ok(filter.apply(observations))
}
