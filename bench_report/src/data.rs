/// A single measured sample as read from the input table.
#[derive(Debug, PartialEq, Clone)]
pub struct Observation {
    pub bench: String,
    pub exe: String,
    pub suite: String,
    pub criterion: String,
    pub unit: String,
    pub envid: String,
    /// `None` when the cell could not be parsed as a number.
    pub value: Option<f64>,
    pub inputsize: Option<i64>,
    pub invocation: Option<i64>,
    pub iteration: Option<i64>,
}

/// A named (criterion, unit) pair and how to present its values.
#[derive(Debug, PartialEq, Clone)]
pub struct MetricSpec {
    /// Short identifier used for file and directory names, e.g. `time_ms`.
    pub key: String,
    pub criterion: String,
    pub unit: String,
    /// Axis label, e.g. "Execution time (ms)".
    pub label: String,
    /// Panel title, e.g. "Total time".
    pub title: String,
    /// Number of decimal places when printing values.
    pub precision: usize,
}

impl MetricSpec {
    /// Checks if the observation measures this metric.
    /// Criterion and unit are compared trimmed and case-insensitively.
    #[must_use]
    pub fn matches(&self, observation: &Observation) -> bool {
        eq_normalized(&self.criterion, &observation.criterion)
            && eq_normalized(&self.unit, &observation.unit)
    }

    /// Formats a value with this metric's precision and unit, e.g. `12.34 ms`.
    /// Count-like metrics are printed without unit suffix.
    pub fn format_value(&self, value: f64) -> String {
        if !value.is_finite() {
            return "n/a".to_string();
        }
        match self.unit.as_str() {
            "ms" | "s" | "us" | "ns" => format!("{:.*} {}", self.precision, value, self.unit),
            _ => format!("{:.*}", self.precision, value),
        }
    }
}

fn eq_normalized(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::observation;

    fn time_metric() -> MetricSpec {
        MetricSpec {
            key: "time_ms".into(),
            criterion: "total".into(),
            unit: "ms".into(),
            label: "Execution time (ms)".into(),
            title: "Total time".into(),
            precision: 2,
        }
    }

    #[test]
    fn test_matches_metric() {
        let metric = time_metric();

        let mut obs = observation("Bounce", "base", 10.0);
        assert!(metric.matches(&obs));

        obs.criterion = " Total ".into();
        obs.unit = "MS".into();
        assert!(metric.matches(&obs));

        obs.criterion = "GC time".into();
        assert!(!metric.matches(&obs));

        obs.criterion = "total".into();
        obs.unit = "bytes".into();
        assert!(!metric.matches(&obs));
    }

    #[test]
    fn test_format_value() {
        let metric = time_metric();
        assert_eq!(metric.format_value(12.345), "12.35 ms");
        assert_eq!(metric.format_value(f64::NAN), "n/a");

        let count = MetricSpec {
            unit: "n".into(),
            precision: 0,
            ..time_metric()
        };
        assert_eq!(count.format_value(41.6), "42");
    }
}
