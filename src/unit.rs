//! Reporting units for elapsed time
//!
//! Elapsed time is always measured in milliseconds and then divided by the
//! unit's conversion factor. Labels outside the recognized set are accepted
//! verbatim and fall back to a factor of 1 (millisecond math), so a typo in a
//! unit never fails a measurement, it only changes the label.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::time::Duration;

/// Time scale used when reporting an elapsed duration
///
/// Units compare and hash by label, so `Other("ms")` is the same unit as
/// `Milliseconds` and converts the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    /// `ns`
    Nanoseconds,
    /// `us`
    Microseconds,
    /// `ms`
    #[default]
    Milliseconds,
    /// `s`
    Seconds,
    /// `m`
    Minutes,
    /// `h`
    Hours,
    /// Free-form label; computed as milliseconds unless it names a known unit
    Other(String),
}

impl Unit {
    /// Every recognized unit, smallest first
    pub const KNOWN: [Unit; 6] = [
        Unit::Nanoseconds,
        Unit::Microseconds,
        Unit::Milliseconds,
        Unit::Seconds,
        Unit::Minutes,
        Unit::Hours,
    ];

    /// Parse a label; never fails, unknown labels become [`Unit::Other`]
    pub fn parse(label: &str) -> Self {
        Self::parse_known(label).unwrap_or_else(|| Unit::Other(label.to_string()))
    }

    fn parse_known(label: &str) -> Option<Self> {
        match label {
            "ns" => Some(Unit::Nanoseconds),
            "us" => Some(Unit::Microseconds),
            "ms" => Some(Unit::Milliseconds),
            "s" => Some(Unit::Seconds),
            "m" => Some(Unit::Minutes),
            "h" => Some(Unit::Hours),
            _ => None,
        }
    }

    /// The recognized unit this label stands for, if any
    fn known(&self) -> Option<Self> {
        match self {
            Unit::Other(label) => Self::parse_known(label),
            known => Some(known.clone()),
        }
    }

    /// Label shown in formatted messages
    pub fn label(&self) -> &str {
        match self {
            Unit::Nanoseconds => "ns",
            Unit::Microseconds => "us",
            Unit::Milliseconds => "ms",
            Unit::Seconds => "s",
            Unit::Minutes => "m",
            Unit::Hours => "h",
            Unit::Other(label) => label,
        }
    }

    /// Number of milliseconds in one of this unit
    pub fn factor(&self) -> f64 {
        match self.known() {
            Some(Unit::Nanoseconds) => 1.0 / 1_000_000.0,
            Some(Unit::Microseconds) => 1.0 / 1_000.0,
            Some(Unit::Seconds) => 1_000.0,
            Some(Unit::Minutes) => 60_000.0,
            Some(Unit::Hours) => 3_600_000.0,
            _ => 1.0,
        }
    }

    /// Whether the label is one of the six recognized units
    pub fn is_known(&self) -> bool {
        self.known().is_some()
    }

    /// Convert a millisecond reading into this unit
    pub fn from_millis(&self, millis: f64) -> f64 {
        // Multiplying keeps whole-millisecond readings exact for sub-ms units.
        match self.known() {
            Some(Unit::Nanoseconds) => millis * 1_000_000.0,
            Some(Unit::Microseconds) => millis * 1_000.0,
            _ => millis / self.factor(),
        }
    }

    /// Convert a duration into this unit
    pub fn convert(&self, duration: Duration) -> f64 {
        self.from_millis(duration.as_nanos() as f64 / 1_000_000.0)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label().hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Unit::parse(s))
    }
}

impl From<&str> for Unit {
    fn from(label: &str) -> Self {
        Unit::parse(label)
    }
}

impl From<String> for Unit {
    fn from(label: String) -> Self {
        Unit::parse(&label)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_is_milliseconds() {
        assert_eq!(Unit::default(), Unit::Milliseconds);
        assert_eq!(Unit::default().label(), "ms");
    }

    #[test]
    fn test_parse_known_labels() {
        for unit in Unit::KNOWN {
            assert_eq!(Unit::parse(unit.label()), unit);
            assert!(unit.is_known());
        }
    }

    #[test]
    fn test_unknown_label_is_kept_verbatim() {
        let unit = Unit::parse("xyz");
        assert_eq!(unit, Unit::Other("xyz".to_string()));
        assert_eq!(unit.label(), "xyz");
        assert_eq!(unit.factor(), 1.0);
        assert!(!unit.is_known());
    }

    #[test]
    fn test_other_with_known_label_is_that_unit() {
        let spelled_out = Unit::Other("s".to_string());
        assert_eq!(spelled_out, Unit::Seconds);
        assert!(spelled_out.is_known());
        assert_eq!(spelled_out.factor(), 1_000.0);
        assert_eq!(spelled_out.from_millis(1_500.0), 1.5);
        assert_eq!(Unit::Other("ns".to_string()).from_millis(2.0), 2_000_000.0);

        let set: HashSet<Unit> = [Unit::Milliseconds, Unit::Other("ms".to_string())]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
        assert_ne!(Unit::Other("xyz".to_string()), Unit::Milliseconds);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert_eq!(Unit::parse("MS"), Unit::Other("MS".to_string()));
    }

    #[test]
    fn test_conversion_factors() {
        assert_eq!(Unit::Nanoseconds.from_millis(1.0), 1_000_000.0);
        assert_eq!(Unit::Microseconds.from_millis(1.0), 1_000.0);
        assert_eq!(Unit::Milliseconds.from_millis(250.0), 250.0);
        assert_eq!(Unit::Seconds.from_millis(1_500.0), 1.5);
        assert_eq!(Unit::Minutes.from_millis(90_000.0), 1.5);
        assert_eq!(Unit::Hours.from_millis(1_800_000.0), 0.5);
    }

    #[test]
    fn test_convert_duration() {
        let d = Duration::from_millis(2_500);
        assert!((Unit::Seconds.convert(d) - 2.5).abs() < 1e-9);
        assert!((Unit::Milliseconds.convert(d) - 2_500.0).abs() < 1e-9);
        assert!((Unit::parse("xyz").convert(d) - 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(Unit::Hours.to_string(), "h");
        assert_eq!("us".parse::<Unit>().unwrap(), Unit::Microseconds);
        assert_eq!(String::from(Unit::Other("ticks".into())), "ticks");
    }
}
