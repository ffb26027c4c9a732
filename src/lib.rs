//! Linetimer - scoped wall-clock timing for blocks of code
//!
//! This library measures how long a delimited region of code takes and
//! reports it as `Code block 'name' took: 12.34500 ms`, optionally in another
//! unit, through a custom sink, or only when a threshold admits it. Functions
//! can be wrapped once so every call reports itself, labelled with its
//! arguments.
//!
//! ```
//! use linetimer::{CodeTimer, TimerConfig};
//!
//! let mut timer = CodeTimer::with_config(TimerConfig::new().with_name("setup").with_unit("us"));
//! let answer = timer.time(|| 6 * 7);
//!
//! assert_eq!(answer, 42);
//! assert_eq!(timer.unit().label(), "us");
//! assert!(timer.last_message().starts_with("Code block 'setup' took: "));
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod instrument;
pub mod repr;
pub mod sink;
pub mod timer;
pub mod unit;

pub use config::{ThresholdMode, TimerConfig};
pub use error::TimerError;
pub use instrument::{kw, Instrumented, Linetimer};
pub use timer::{CodeTimer, Measurement, TimerGuard};
pub use unit::Unit;
