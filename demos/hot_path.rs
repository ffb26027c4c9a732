//! Instrumenting a small pipeline with linetimer
//!
//! Run with `RUST_LOG=linetimer=trace` to also see the timer's own
//! diagnostics:
//!
//! ```bash
//! RUST_LOG=info cargo run --example hot_path -- demos/linetimer.toml
//! ```

use anyhow::Result;
use linetimer::instrument::kw;
use linetimer::sink::TracingSink;
use linetimer::{linetimer, CodeTimer, Linetimer, ThresholdMode, TimerConfig};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn checksum(data: &[u8], seed: u32) -> u32 {
    thread::sleep(Duration::from_millis(15));
    data.iter()
        .fold(seed, |acc, &b| acc.rotate_left(5) ^ u32::from(b))
}

fn main() -> Result<()> {
    init_tracing();

    // Settings from a TOML file when one is given, defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => TimerConfig::from_file(path)?,
        None => TimerConfig::new().with_name("pipeline"),
    };

    // Only blocks slower than 10ms are reported, through tracing.
    let slow_only = Linetimer::new()
        .with_threshold(10.0)?
        .with_threshold_mode(ThresholdMode::AtLeast)
        .with_sink(TracingSink::default());

    let mut whole = CodeTimer::with_config(config);
    whole.time(|| {
        let mut load = CodeTimer::with_config(TimerConfig::new().with_name("load").with_unit("us"));
        load.time(|| thread::sleep(Duration::from_millis(20)));

        let checksum = linetimer!(Linetimer::new().with_show_args(true), checksum);
        let sum = checksum.call((&[1u8, 2, 3][..], kw("seed", 7u32)));
        println!("checksum = {sum:#x}");

        let step = slow_only.wrap("step", |ms: u64| thread::sleep(Duration::from_millis(ms)));
        for ms in [1u64, 25, 2] {
            step.call((ms,));
        }
    });

    if let Some(measurement) = whole.measurement() {
        println!("total: {:.3} {}", measurement.elapsed, measurement.unit);
    }

    Ok(())
}
