//! Callback-based logging
//!
//! The library never writes to stdout, stderr or files on its own. Hosts
//! install a callback on the manager and every diagnostic is routed through it.

use std::fmt;

/// Log severity passed to the host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub enum LogLevel {
    None = 0,
    Trace = 1,
    Info = 2,
    Warn = 3,
    Err = 4,
    Critical = 5,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "NONE"),
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Err => write!(f, "ERR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Host logging callback.
///
/// The message is only borrowed for the duration of the call.
pub type LogFn = Box<dyn Fn(LogLevel, &str)>;

/// Holds the (optional) host callback
#[derive(Default)]
pub struct Logger {
    sink: Option<LogFn>,
}

impl Logger {
    pub fn new(sink: Option<LogFn>) -> Self {
        Self { sink }
    }

    /// Install, replace or clear the callback
    pub fn set_sink(&mut self, sink: Option<LogFn>) {
        self.sink = sink;
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Log a message
    pub fn log(&self, level: LogLevel, msg: &str) {
        if let Some(sink) = &self.sink {
            sink(level, msg);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Log a formatted message through a `Logger`.
///
/// Formatting only happens when a callback is installed.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:ident, $($arg:tt)*) => {{
        let logger: &$crate::log::Logger = &$logger;
        if logger.is_enabled() {
            logger.log($crate::log::LogLevel::$level, &format!($($arg)*));
        }
    }};
}
