use std::sync::{Arc, OnceLock};

/// Receives log messages emitted by this crate.
///
/// Hosts implement this to route records into their own logging setup and
/// install it once with [`set_logger`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use issuer_agent_core::logger::{set_logger, LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, target: &str, message: String) {
///         eprintln!("[{level:?}] {target}: {message}");
///     }
/// }
///
/// set_logger(Arc::new(StderrLogger));
/// ```
pub trait Logger: Sync + Send {
    /// Records `message` at `level`. `target` is the emitting module path.
    fn log(&self, level: LogLevel, target: &str, message: String);
}

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Very detailed tracing output.
    Trace,
    /// Debugging information.
    Debug,
    /// Progress of an operation.
    Info,
    /// Recoverable problems, e.g. a rejected request or a scheduled retry.
    Warn,
    /// Failures surfaced to the caller.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

/// Bridges the `log` facade to the installed [`Logger`].
struct ForwardingLogger;

impl ForwardingLogger {
    /// Debug and trace records from dependencies (HTTP stack, TLS) are dropped.
    fn accepts(metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
            || metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }
}

impl log::Log for ForwardingLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Self::accepts(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !Self::accepts(record.metadata()) {
            return;
        }
        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(
                record.level().into(),
                record.target(),
                record.args().to_string(),
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs `logger` as the destination of every record logged by this crate.
///
/// Only the first call has an effect; later calls are ignored with a warning
/// routed to the already-installed logger. If another `log` implementation
/// was registered by the host, records keep going there instead.
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        log::warn!("logger already set, ignoring");
        return;
    }

    static LOGGER: ForwardingLogger = ForwardingLogger;
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
