use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, name = "bench-report")]
pub struct Cli {
    /// Increase verbosity level (can be specified multiple times.) The first level sets level
    /// "info", second sets level "debug", and third sets level "trace" for the logger.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input table and the rows to consider from it
#[derive(Args)]
pub struct CliSelection {
    /// CSV file with benchmark observations. Requires the columns
    /// bench, exe, suite, criterion, unit, envid and value.
    pub input: PathBuf,

    /// Configuration (exe) all speedups are computed against.
    /// Falls back to `report.baseline` from the configuration file.
    #[arg(short, long, value_parser=parse_spaceless_string)]
    pub baseline: Option<String>,

    /// Drop all observations of this suite (can be specified multiple times)
    #[arg(short = 'x', long = "exclude-suite")]
    pub exclude_suite: Vec<String>,

    /// Only consider benchmarks whose name matches any of these regular expressions
    #[arg(short = 'f', long = "filter")]
    pub filter: Vec<String>,

    /// Only consider configurations (exe) matching any of these regular expressions
    #[arg(short = 'e', long = "exe")]
    pub exe: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the collapsed median table and the bench by exe median pivot
    /// for each metric.
    ///
    /// The collapsed median is computed in two passes: first the median of
    /// all iterations of one invocation, then the median of these invocation
    /// medians per bench, exe, suite and input size.
    Summary {
        #[command(flatten)]
        selection: CliSelection,

        /// Restrict output to these metrics (by key, e.g. `time_ms`)
        #[arg(short, long, value_parser=parse_spaceless_string)]
        metric: Vec<String>,
    },

    /// Rank all configurations against the baseline for each metric.
    ///
    /// For every benchmark that has baseline observations, the speedup of a
    /// configuration is `mean(baseline) / mean(exe)`. Configurations are ranked by
    /// the geometric mean of their speedups, then by their win rate (fraction of
    /// benchmarks where they have the lowest mean), then by their median speedup.
    ///
    /// Metrics without any baseline observation are skipped.
    Compare {
        #[command(flatten)]
        selection: CliSelection,

        /// Restrict output to these metrics (by key, e.g. `time_ms`)
        #[arg(short, long, value_parser=parse_spaceless_string)]
        metric: Vec<String>,

        /// Output destination. `-` prints the ranking, `.txt` writes it to a file,
        /// `.csv` writes a table and `.html` a dashboard chart.
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Write the full report tree: per benchmark charts, panels, CSV summaries,
    /// rankings, summary charts and a dashboard.
    Report {
        #[command(flatten)]
        selection: CliSelection,

        /// Root directory of the report.
        /// Falls back to `report.output_dir` from the configuration file.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the per environment breakdown below `envs/`
        #[arg(long)]
        no_envs: bool,
    },

    /// Show the configuration files in use and the effective settings
    Config {},
}

fn parse_spaceless_string(s: &str) -> Result<String> {
    if s.split_whitespace().count() > 1 {
        Err(anyhow!("invalid string: found space in '{}'", s))
    } else {
        Ok(String::from(s))
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn spaceless_strings() {
        assert!(parse_spaceless_string("som-rs-bc-baseline").is_ok());
        assert!(parse_spaceless_string("two words").is_err());
    }

    #[test]
    fn parse_report_arguments() {
        let cli = Cli::try_parse_from([
            "bench-report",
            "-vv",
            "report",
            "results.csv",
            "-b",
            "base",
            "-x",
            "interpreter",
            "-x",
            "somsom",
            "--no-envs",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Report {
                selection,
                output_dir,
                no_envs,
            } => {
                assert_eq!(selection.input, PathBuf::from("results.csv"));
                assert_eq!(selection.baseline.as_deref(), Some("base"));
                assert_eq!(selection.exclude_suite, vec!["interpreter", "somsom"]);
                assert!(output_dir.is_none());
                assert!(no_envs);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn compare_defaults_to_stdout() {
        let cli = Cli::try_parse_from(["bench-report", "compare", "results.csv"]).unwrap();
        match cli.command {
            Commands::Compare { output, metric, .. } => {
                assert_eq!(output, PathBuf::from("-"));
                assert!(metric.is_empty());
            }
            _ => panic!("expected compare command"),
        }
    }
}
