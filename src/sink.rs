//! Destinations for formatted timing messages
//!
//! Any `Fn(&str) + Send + Sync` closure is a [`Sink`], which covers the common
//! "pass my logger's info function" case. The structs below cover the rest:
//! standard streams, `tracing` events and in-memory capture.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Level;

/// Consumer of one fully formatted timing message
///
/// Sinks are infallible by signature. A sink that panics propagates the panic
/// to whoever released the timer; if that release happens while the timed
/// region is already unwinding, the process aborts.
pub trait Sink: Send + Sync {
    /// Deliver a message
    fn emit(&self, message: &str);
}

impl<F> Sink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        self(message)
    }
}

/// Shared handle to a sink, cloned into every timer built from one config
pub type SharedSink = Arc<dyn Sink>;

/// Wrap a sink for use in a [`TimerConfig`](crate::config::TimerConfig)
pub fn shared<S: Sink + 'static>(sink: S) -> SharedSink {
    Arc::new(sink)
}

/// Writes messages to standard output (the default when no sink is set)
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, message: &str) {
        println!("{message}");
    }
}

/// Writes messages to standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn emit(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Emits messages as `tracing` events under the `linetimer` target
///
/// The crate never installs a subscriber; events go wherever the application
/// has routed `tracing` output.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    /// Emit at the given level
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Level events are emitted at
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Sink for TracingSink {
    fn emit(&self, message: &str) {
        match self.level {
            Level::ERROR => tracing::error!(target: "linetimer", "{message}"),
            Level::WARN => tracing::warn!(target: "linetimer", "{message}"),
            Level::INFO => tracing::info!(target: "linetimer", "{message}"),
            Level::DEBUG => tracing::debug!(target: "linetimer", "{message}"),
            _ => tracing::trace!(target: "linetimer", "{message}"),
        }
    }
}

/// Collects messages in memory
///
/// Clones share the same buffer, so one clone can be handed to a timer while
/// another is kept for inspection.
#[derive(Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Most recent message
    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// Number of messages received
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been received
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every stored message
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a Vec<String> half-written.
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn emit(&self, message: &str) {
        self.lock().push(message.to_string());
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("messages", &self.len())
            .finish()
    }
}
