//! 日志接收器：批处理引擎用于输出诊断信息的可插拔日志接口。
//!
//! Diagnostic logging sinks.
//!
//! The engine reports its lifecycle (worker start, enqueue, flushes, shutdown)
//! through a [`Logger`]. Every sink must be safe to call from many workers and
//! producers at once; sinks that need serialized output carry their own lock,
//! so two batchers never contend on shared logging state.
//!
//! | Sink | Description |
//! |------|-------------|
//! | [`StdoutLogger`] | Default; timestamped lines on stdout |
//! | [`LineLogger`] | Timestamped lines on any `io::Write` |
//! | [`TracingLogger`] | Forwards to `tracing` under target `batcher` |
//! | [`NoopLogger`] | Discards everything |
//!
//! Any `Fn(fmt::Arguments<'_>) + Send + Sync` closure is also a [`Logger`].

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Timestamp layout of the default line logger, e.g. `2024/01/23 01:23:23`.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Minimal sink the batcher logs messages to.
///
/// Logging never fails the caller's operation: implementations swallow their
/// own write errors.
pub trait Logger: Send + Sync {
    fn log(&self, args: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}

/// Shared logger handle as stored in the resolved configuration.
pub type SharedLogger = Arc<dyn Logger>;

/// Writes one timestamped line per message to the wrapped writer.
pub struct LineLogger<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Logger for LineLogger<W> {
    fn log(&self, args: fmt::Arguments<'_>) {
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let mut w = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(w, "{} {}", now, args);
    }
}

/// Default sink: timestamped lines on stdout.
pub type StdoutLogger = LineLogger<io::Stdout>;

impl Default for StdoutLogger {
    fn default() -> Self {
        LineLogger::new(io::stdout())
    }
}

/// Forwards messages to `tracing` events under the `batcher` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    level: tracing::Level,
}

impl TracingLogger {
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> tracing::Level {
        self.level
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(tracing::Level::DEBUG)
    }
}

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        match self.level {
            tracing::Level::ERROR => tracing::error!(target: "batcher", "{}", args),
            tracing::Level::WARN => tracing::warn!(target: "batcher", "{}", args),
            tracing::Level::INFO => tracing::info!(target: "batcher", "{}", args),
            tracing::Level::DEBUG => tracing::debug!(target: "batcher", "{}", args),
            _ => tracing::trace!(target: "batcher", "{}", args),
        }
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
}

pub fn default_logger() -> SharedLogger {
    Arc::new(StdoutLogger::default())
}

macro_rules! log_event {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logging::Logger::log(&*$logger, format_args!($($arg)+))
    };
}
pub(crate) use log_event;
