//! Timer configuration
//!
//! A [`TimerConfig`] is built in code with the `with_*` methods or loaded from
//! TOML. Sinks cannot be expressed in TOML, so a loaded config reports to
//! standard output until one is attached with [`TimerConfig::with_sink`].
//!
//! # Example linetimer.toml
//!
//! ```toml
//! name = "db_query"
//! unit = "us"
//! threshold = 250.0
//! threshold_mode = "at_least"
//! silent = false
//! ```

use crate::error::TimerError;
use crate::sink::{SharedSink, Sink};
use crate::unit::Unit;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// How a threshold gates emission
///
/// `AtMost` reproduces the historical behaviour: a message is emitted only
/// when the block took *at most* the threshold, so slow blocks are the ones
/// suppressed. That is the opposite of the usual "only report slow blocks"
/// intent, which `AtLeast` provides. `AtMost` stays the default so existing
/// thresholds keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Emit when `elapsed <= threshold`
    #[default]
    AtMost,
    /// Emit when `elapsed >= threshold`
    AtLeast,
}

impl ThresholdMode {
    /// Whether `elapsed` passes `threshold` under this mode
    pub fn admits(self, elapsed: f64, threshold: f64) -> bool {
        match self {
            ThresholdMode::AtMost => elapsed <= threshold,
            ThresholdMode::AtLeast => elapsed >= threshold,
        }
    }
}

/// Configuration shared by [`CodeTimer`](crate::timer::CodeTimer) and the
/// call wrapper
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Label shown in the message; `None` or empty omits the quoted segment
    pub name: Option<String>,
    /// Suppress every message
    pub silent: bool,
    /// Reporting unit
    pub unit: Unit,
    /// Emission bound, in `unit`; must be finite (see [`TimerConfig::validate`])
    pub threshold: Option<f64>,
    /// Comparison applied against `threshold`
    pub threshold_mode: ThresholdMode,
    /// Message destination; standard output when unset
    #[serde(skip)]
    pub sink: Option<SharedSink>,
}

impl TimerConfig {
    /// Default configuration: unnamed, milliseconds, stdout, no threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Suppress or allow emission
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Set the reporting unit (any label is accepted)
    pub fn with_unit(mut self, unit: impl Into<Unit>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the emission threshold, in the reporting unit
    ///
    /// Fails with [`TimerError::InvalidThreshold`] for NaN or infinite values,
    /// which no elapsed time could ever be compared against.
    pub fn with_threshold(mut self, threshold: f64) -> std::result::Result<Self, TimerError> {
        if !threshold.is_finite() {
            return Err(TimerError::InvalidThreshold(threshold));
        }
        self.threshold = Some(threshold);
        Ok(self)
    }

    /// Choose how the threshold is compared
    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    /// Route messages to `sink` instead of standard output
    pub fn with_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Route messages to an already shared sink
    pub fn with_shared_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Name to render, treating an empty string as absent
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether a block that took `elapsed` (in `unit`) should be reported
    pub fn should_emit(&self, elapsed: f64) -> bool {
        if self.silent {
            return false;
        }
        match self.threshold {
            Some(threshold) => self.threshold_mode.admits(elapsed, threshold),
            None => true,
        }
    }

    /// Reject thresholds that can never compare meaningfully
    pub fn validate(&self) -> std::result::Result<(), TimerError> {
        match self.threshold {
            Some(threshold) if !threshold.is_finite() => {
                Err(TimerError::InvalidThreshold(threshold))
            }
            _ => Ok(()),
        }
    }

    /// Load a configuration from a TOML file
    ///
    /// ```no_run
    /// use linetimer::config::TimerConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = TimerConfig::from_file("linetimer.toml")?;
    /// println!("reporting in {}", config.unit);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid timer config in {}", path.display()))
    }

    /// Load a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("name", &self.name)
            .field("silent", &self.silent)
            .field("unit", &self.unit)
            .field("threshold", &self.threshold)
            .field("threshold_mode", &self.threshold_mode)
            .field("sink", &self.sink.as_ref().map(|_| "custom"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_default_config() {
        let config = TimerConfig::new();
        assert_eq!(config.name, None);
        assert!(!config.silent);
        assert_eq!(config.unit, Unit::Milliseconds);
        assert_eq!(config.threshold, None);
        assert_eq!(config.threshold_mode, ThresholdMode::AtMost);
        assert!(config.sink.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = TimerConfig::new()
            .with_name("ct")
            .with_unit("s")
            .with_threshold(2.0)
            .unwrap()
            .with_threshold_mode(ThresholdMode::AtLeast)
            .with_silent(true)
            .with_sink(MemorySink::new());

        assert_eq!(config.display_name(), Some("ct"));
        assert_eq!(config.unit, Unit::Seconds);
        assert_eq!(config.threshold, Some(2.0));
        assert_eq!(config.threshold_mode, ThresholdMode::AtLeast);
        assert!(config.silent);
        assert!(config.sink.is_some());
    }

    #[test]
    fn test_empty_name_is_not_displayed() {
        let config = TimerConfig::new().with_name("");
        assert_eq!(config.display_name(), None);
    }

    #[test]
    fn test_should_emit_without_threshold() {
        assert!(TimerConfig::new().should_emit(1e12));
        assert!(!TimerConfig::new().with_silent(true).should_emit(0.0));
    }

    #[test]
    fn test_should_emit_at_most_is_a_ceiling() {
        let config = TimerConfig::new().with_threshold(100.0).unwrap();
        assert!(config.should_emit(10.0));
        assert!(config.should_emit(100.0));
        assert!(!config.should_emit(100.5));
    }

    #[test]
    fn test_should_emit_at_least_is_a_floor() {
        let config = TimerConfig::new()
            .with_threshold(100.0)
            .unwrap()
            .with_threshold_mode(ThresholdMode::AtLeast);
        assert!(!config.should_emit(10.0));
        assert!(config.should_emit(100.0));
        assert!(config.should_emit(250.0));
    }

    #[test]
    fn test_silent_beats_threshold() {
        let config = TimerConfig::new()
            .with_threshold(100.0)
            .unwrap()
            .with_silent(true);
        assert!(!config.should_emit(1.0));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            name = "db_query"
            unit = "us"
            threshold = 250.0
            threshold_mode = "at_least"
            silent = true
        "#;

        let config = TimerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.name.as_deref(), Some("db_query"));
        assert_eq!(config.unit, Unit::Microseconds);
        assert_eq!(config.threshold, Some(250.0));
        assert_eq!(config.threshold_mode, ThresholdMode::AtLeast);
        assert!(config.silent);
        assert!(config.sink.is_none());
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = TimerConfig::from_toml_str("").unwrap();
        assert_eq!(config.unit, Unit::Milliseconds);
        assert_eq!(config.threshold, None);
    }

    #[test]
    fn test_parse_unknown_unit_label() {
        let config = TimerConfig::from_toml_str(r#"unit = "xyz""#).unwrap();
        assert_eq!(config.unit, Unit::Other("xyz".to_string()));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = TimerConfig::from_toml_str("unit = ");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_threshold_mode() {
        let result = TimerConfig::from_toml_str(r#"threshold_mode = "sometimes""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_threshold_rejects_non_finite() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = TimerConfig::new().with_threshold(bad).unwrap_err();
            assert!(matches!(err, TimerError::InvalidThreshold(_)), "{err}");
        }
        assert_eq!(
            TimerConfig::new().with_threshold(-1.5).unwrap().threshold,
            Some(-1.5)
        );
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let mut config = TimerConfig::new();
        config.threshold = Some(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(TimerError::InvalidThreshold(t)) if t.is_nan()
        ));
    }

    #[test]
    fn test_serialize_round_trips_unit_label() {
        let config = TimerConfig::new().with_name("x").with_unit("ticks");
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("unit = \"ticks\""));

        let back = TimerConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.unit, Unit::Other("ticks".to_string()));
        assert_eq!(back.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_debug_hides_sink_internals() {
        let config = TimerConfig::new().with_sink(|_: &str| {});
        let debug = format!("{:?}", config);
        assert!(debug.contains("sink: Some(\"custom\")"));
    }
}
