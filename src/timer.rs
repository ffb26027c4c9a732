//! Scoped code-block timer
//!
//! A [`CodeTimer`] records a start reading when acquired and, when released,
//! converts the elapsed time to its configured unit and (subject to `silent`
//! and the threshold) emits a message of the form
//!
//! ```text
//! Code block 'name' took: 12.34500 ms
//! Code block took: 12.34500 ms
//! ```
//!
//! Release is tied to [`TimerGuard`]'s `Drop`, so it runs on every exit path
//! from the timed region, including early returns and panics.
//!
//! # Example
//!
//! ```
//! use linetimer::{CodeTimer, TimerConfig};
//! use linetimer::sink::MemorySink;
//!
//! let messages = MemorySink::new();
//! let mut timer = CodeTimer::with_config(
//!     TimerConfig::new().with_name("parse").with_sink(messages.clone()),
//! );
//!
//! {
//!     let _guard = timer.start();
//!     // ... timed region ...
//! }
//!
//! assert!(timer.elapsed().unwrap() >= 0.0);
//! assert!(timer.last_message().starts_with("Code block 'parse' took: "));
//! assert_eq!(messages.len(), 1);
//! ```

use crate::clock::{Clock, MonotonicClock};
use crate::config::TimerConfig;
use crate::error::{Result, TimerError};
use crate::unit::Unit;
use serde::Serialize;
use std::time::Duration;

/// Render the report line for a block
pub fn format_message(name: Option<&str>, elapsed: f64, unit: &Unit) -> String {
    match name {
        Some(name) => format!("Code block '{name}' took: {elapsed:.5} {unit}"),
        None => format!("Code block took: {elapsed:.5} {unit}"),
    }
}

/// Snapshot of one completed measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Display name, if any
    pub name: Option<String>,
    /// Elapsed time in `unit`
    pub elapsed: f64,
    /// Reporting unit
    pub unit: Unit,
    /// Emitted message, `None` when suppressed
    pub message: Option<String>,
}

/// Times one region of code per acquire/release cycle
#[derive(Debug)]
pub struct CodeTimer<C: Clock = MonotonicClock> {
    config: TimerConfig,
    clock: C,
    started_at: Option<Duration>,
    elapsed: Option<f64>,
    last_message: String,
}

impl CodeTimer {
    /// Unnamed timer reporting milliseconds to standard output
    pub fn new() -> Self {
        Self::with_config(TimerConfig::default())
    }

    /// Named timer with otherwise default settings
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(TimerConfig::new().with_name(name))
    }

    /// Timer using the wall clock
    pub fn with_config(config: TimerConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl Default for CodeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CodeTimer<C> {
    /// Timer reading time from `clock`
    pub fn with_clock(config: TimerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            started_at: None,
            elapsed: None,
            last_message: String::new(),
        }
    }

    /// Configuration this timer reports with
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Configured name, as given (possibly empty)
    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    /// Reporting unit
    pub fn unit(&self) -> &Unit {
        &self.config.unit
    }

    /// True between acquire and release
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Elapsed time of the last completed cycle, in the configured unit
    ///
    /// `None` until the first release.
    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    /// Message produced by the last release; empty when it did not emit
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Snapshot of the last completed cycle
    pub fn measurement(&self) -> Option<Measurement> {
        self.elapsed.map(|elapsed| self.snapshot(elapsed))
    }

    fn snapshot(&self, elapsed: f64) -> Measurement {
        Measurement {
            name: self.config.name.clone(),
            elapsed,
            unit: self.config.unit.clone(),
            message: (!self.last_message.is_empty()).then(|| self.last_message.clone()),
        }
    }

    /// Record the start reading, replacing any previous one
    pub fn acquire(&mut self) {
        if self.started_at.is_some() {
            tracing::trace!(name = ?self.config.name, "timer re-acquired, previous start discarded");
        }
        self.started_at = Some(self.clock.now());
        tracing::trace!(name = ?self.config.name, "timer acquired");
    }

    /// Stop timing, store the elapsed time and emit if eligible
    ///
    /// Returns the elapsed time in the configured unit. Fails with
    /// [`TimerError::NotStarted`] when there is no matching acquire, leaving
    /// the previous results untouched.
    pub fn release(&mut self) -> Result<f64> {
        let now = self.clock.now();
        let started_at = self.started_at.take().ok_or_else(|| TimerError::NotStarted {
            name: self.config.name.clone(),
        })?;

        let elapsed = self.config.unit.convert(now.saturating_sub(started_at));
        self.elapsed = Some(elapsed);
        self.last_message.clear();

        tracing::trace!(name = ?self.config.name, elapsed, unit = %self.config.unit, "timer released");

        if !self.config.should_emit(elapsed) {
            tracing::debug!(
                name = ?self.config.name,
                silent = self.config.silent,
                threshold = ?self.config.threshold,
                "timer message suppressed"
            );
            return Ok(elapsed);
        }

        self.last_message = format_message(self.config.display_name(), elapsed, &self.config.unit);
        match &self.config.sink {
            Some(sink) => sink.emit(&self.last_message),
            None => println!("{}", self.last_message),
        }

        Ok(elapsed)
    }

    /// Acquire now and release when the returned guard drops
    pub fn start(&mut self) -> TimerGuard<'_, C> {
        self.acquire();
        TimerGuard { timer: self }
    }

    /// Time a closure, returning its result unchanged
    ///
    /// The timer is released before the closure's result (or panic) reaches
    /// the caller.
    pub fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let _guard = self.start();
        f()
    }

    /// Time a closure, returning its result and the measurement
    pub fn time_measured<R>(&mut self, f: impl FnOnce() -> R) -> (R, Measurement) {
        let result = self.time(f);
        let measurement = self.snapshot(self.elapsed.unwrap_or_default());
        (result, measurement)
    }
}

/// Releases its timer when dropped
#[must_use = "the timer is released as soon as the guard is dropped"]
pub struct TimerGuard<'a, C: Clock = MonotonicClock> {
    timer: &'a mut CodeTimer<C>,
}

impl<C: Clock> TimerGuard<'_, C> {
    /// Time elapsed so far, in the timer's unit, without releasing
    pub fn peek(&self) -> f64 {
        match self.timer.started_at {
            Some(started_at) => {
                let so_far = self.timer.clock.now().saturating_sub(started_at);
                self.timer.config.unit.convert(so_far)
            }
            None => 0.0,
        }
    }
}

impl<C: Clock> Drop for TimerGuard<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.timer.release() {
            tracing::warn!("timer guard release failed: {}", e);
        }
    }
}
