//! Shared fixtures for unit tests, integration tests and benchmarks.

use std::fs;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};

use crate::data::Observation;

/// Header line of the input table, in the column order used by the fixtures.
pub const CSV_HEADER: &str = "bench,exe,suite,criterion,unit,envid,value,inputsize,invocation,iteration";

/// A wall time observation (`total`/`ms`) in suite `macro` on environment `1`.
pub fn observation(bench: &str, exe: &str, value: f64) -> Observation {
    Observation {
        bench: bench.to_string(),
        exe: exe.to_string(),
        suite: "macro".to_string(),
        criterion: "total".to_string(),
        unit: "ms".to_string(),
        envid: "1".to_string(),
        value: Some(value),
        inputsize: Some(1),
        invocation: Some(1),
        iteration: Some(1),
    }
}

/// Same as [`observation`] but for an arbitrary criterion and unit.
pub fn metric_observation(
    bench: &str,
    exe: &str,
    criterion: &str,
    unit: &str,
    value: f64,
) -> Observation {
    Observation {
        criterion: criterion.to_string(),
        unit: unit.to_string(),
        ..observation(bench, exe, value)
    }
}

/// Renders observations as CSV in the [`CSV_HEADER`] column order.
pub fn to_csv(observations: &[Observation]) -> String {
    let opt = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for o in observations {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            o.bench,
            o.exe,
            o.suite,
            o.criterion,
            o.unit,
            o.envid,
            o.value.map(|v| v.to_string()).unwrap_or_default(),
            opt(o.inputsize),
            opt(o.invocation),
            opt(o.iteration),
        ));
    }
    out
}

/// Writes the observations as `results.csv` into a fresh temporary directory.
///
/// # Panics
/// Panics if the temporary directory or file cannot be created.
pub fn write_csv(observations: &[Observation]) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("results.csv");
    fs::write(&path, to_csv(observations)).expect("Failed to write CSV fixture");
    (dir, path)
}

/// Deterministic synthetic data set: every exe runs every bench for all four
/// built-in metrics with the given number of invocations and iterations.
/// `exe-0` is the slowest configuration and is meant to be used as baseline.
pub fn synthetic_observations(
    benches: usize,
    exes: usize,
    invocations: i64,
    iterations: i64,
) -> Vec<Observation> {
    let metrics = [
        ("total", "ms"),
        ("Allocated", "bytes"),
        ("GC time", "ms"),
        ("GC count", "n"),
    ];
    let mut result = vec![];
    for b in 0..benches {
        for e in 0..exes {
            for (m, (criterion, unit)) in metrics.iter().enumerate() {
                for invocation in 1..=invocations {
                    for iteration in 1..=iterations {
                        let base = (b + 1) as f64 * 100.0 * (m + 1) as f64;
                        let jitter = ((invocation * 7 + iteration * 3) % 5) as f64;
                        let value = base / (e + 1) as f64 + jitter;
                        result.push(Observation {
                            bench: format!("bench-{b}"),
                            exe: format!("exe-{e}"),
                            suite: format!("suite-{}", b % 2),
                            criterion: criterion.to_string(),
                            unit: unit.to_string(),
                            envid: format!("{}", invocation % 2),
                            value: Some(value),
                            inputsize: Some(1),
                            invocation: Some(invocation),
                            iteration: Some(iteration),
                        });
                    }
                }
            }
        }
    }
    result
}
