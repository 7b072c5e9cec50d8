use bytesize::ByteSize;
use fundu::DurationParser;
use human_repr::{HumanCount, HumanDuration};
use std::str::FromStr;

/// A metric value interpreted through its unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Duration(std::time::Duration),
    DataSize(u64), // bytes
    Count(f64),    // unitless or custom
}

/// Interprets a value in the given unit.
/// Units that are neither durations nor data sizes fall back to a plain count.
pub fn quantity(value: f64, unit: &str) -> Quantity {
    if value.is_finite() && value >= 0.0 {
        if let Some(duration) = parse_duration(value, unit) {
            return Quantity::Duration(duration);
        }
        if let Some(size) = parse_data_size(value, unit) {
            return Quantity::DataSize(size);
        }
    }
    Quantity::Count(value)
}

/// Auto-scaled rendering, e.g. `1.5GB` for 1500 MB or `9s` for 9000 ms.
pub fn humanize(value: f64, unit: &str) -> String {
    match quantity(value, unit) {
        Quantity::Duration(d) => d.human_duration().to_string(),
        Quantity::DataSize(bytes) => bytes.human_count_bytes().to_string(),
        Quantity::Count(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Quantity::Count(v) => format!("{:.3}", v),
    }
}

fn parse_duration(value: f64, unit: &str) -> Option<std::time::Duration> {
    let parser = DurationParser::with_all_time_units();
    // Try without space first (9000ms), then with space (9000 ms)
    let inputs = [format!("{}{}", value, unit), format!("{} {}", value, unit)];

    inputs.iter().find_map(|input| {
        parser
            .parse(input)
            .ok()
            .and_then(|d| std::time::Duration::try_from(d).ok())
    })
}

fn parse_data_size(value: f64, unit: &str) -> Option<u64> {
    // "bytes" is how allocation counters are usually labelled
    let unit = if unit.eq_ignore_ascii_case("bytes") {
        "B"
    } else {
        unit
    };
    let inputs = [format!("{}{}", value, unit), format!("{} {}", value, unit)];

    inputs
        .iter()
        .find_map(|input| ByteSize::from_str(input).ok().map(|bs| bs.as_u64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_milliseconds() {
        assert_eq!(humanize(9000.0, "ms"), "9s");
        assert!(matches!(quantity(12.5, "ms"), Quantity::Duration(_)));
    }

    #[test]
    fn test_duration_seconds_to_minutes() {
        let formatted = humanize(125000.0, "ms");
        assert!(formatted.contains("2:05"));
    }

    #[test]
    fn test_allocated_bytes() {
        assert_eq!(quantity(2048.0, "bytes"), Quantity::DataSize(2048));
        assert_eq!(humanize(1_500_000_000.0, "bytes"), "1.5GB");
    }

    #[test]
    fn test_data_size_kilobytes() {
        assert_eq!(humanize(9000.0, "KB"), "9MB");
    }

    #[test]
    fn test_gc_count_is_a_count() {
        assert_eq!(quantity(42.0, "n"), Quantity::Count(42.0));
        assert_eq!(humanize(42.0, "n"), "42");
        assert_eq!(humanize(42.5, "widgets"), "42.500");
    }

    #[test]
    fn test_invalid_values_are_counts() {
        assert!(matches!(quantity(-3.0, "ms"), Quantity::Count(_)));
        assert!(matches!(quantity(f64::NAN, "bytes"), Quantity::Count(_)));
    }
}
