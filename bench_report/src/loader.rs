use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;
use log::{debug, warn};
use serde::Deserialize;

use crate::data::Observation;

/// Columns every input table has to provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "bench",
    "exe",
    "suite",
    "criterion",
    "unit",
    "envid",
    "value",
];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing required column '{0}' in input table")]
    MissingColumn(String),

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    bench: String,
    exe: String,
    suite: String,
    criterion: String,
    unit: String,
    envid: String,
    value: Option<String>,
    #[serde(default)]
    inputsize: Option<String>,
    #[serde(default)]
    invocation: Option<String>,
    #[serde(default)]
    iteration: Option<String>,
}

/// Loads all observations from the CSV file at `path`.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = read_observations(file)?;
    debug!(
        "Loaded {} observations from {}",
        observations.len(),
        path.display()
    );
    Ok(observations)
}

/// Reads observations from any CSV source.
///
/// Column names are normalized (trimmed, lower case, spaces replaced by `_`).
/// Values that are not numbers are kept as missing values instead of failing the load.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>, LoadError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers: StringRecord = rdr.headers()?.iter().map(normalize_column_name).collect();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(LoadError::MissingColumn(missing.to_string()));
    }
    rdr.set_headers(headers);

    let mut coerced = 0usize;
    let mut result = vec![];
    for record in rdr.deserialize() {
        let raw: RawObservation = record?;
        let value = raw.value.as_deref().and_then(parse_value);
        if value.is_none() {
            coerced += 1;
        }
        result.push(Observation {
            bench: raw.bench,
            exe: raw.exe,
            suite: raw.suite,
            criterion: raw.criterion,
            unit: raw.unit,
            envid: raw.envid,
            value,
            inputsize: raw.inputsize.as_deref().and_then(parse_integer),
            invocation: raw.invocation.as_deref().and_then(parse_integer),
            iteration: raw.iteration.as_deref().and_then(parse_integer),
        });
    }

    if coerced > 0 {
        warn!("{coerced} value(s) could not be parsed as numbers and are treated as missing");
    }

    Ok(result)
}

fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().split_whitespace().join("_")
}

fn parse_value(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_integer(cell: &str) -> Option<i64> {
    cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
