//! Job log: one plain-text line per event on standard output.
//!
//! Line format is `File: {file_name} {LEVEL}: {message}`. INFO and ERROR
//! lines are always written; DEBUG lines only when debug logging was
//! enabled at startup. If the sink itself fails, the line is written to
//! the fallback writer (stderr by default) with an
//! ` Additional Details - {details}` suffix instead.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Severity of a job log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a single job log line (without trailing newline).
pub fn format_line(file_name: &str, level: LogLevel, message: &str, details: Option<&str>) -> String {
    match details {
        Some(details) if !details.is_empty() => {
            format!("File: {file_name} {level}: {message} Additional Details - {details}")
        }
        _ => format!("File: {file_name} {level}: {message}"),
    }
}

// ---------------------------------------------------------------------------
// JobLogger
// ---------------------------------------------------------------------------

/// Writes job log lines to a sink, gating DEBUG lines on a flag.
pub struct JobLogger {
    debug: bool,
    sink: Mutex<Box<dyn Write + Send>>,
    /// Receives the line, with details, when `sink` rejects a write.
    fallback: Mutex<Box<dyn Write + Send>>,
}

impl JobLogger {
    /// Logger writing to standard output.
    pub fn stdout(debug: bool) -> Self {
        Self::with_sink(debug, io::stdout())
    }

    /// Logger writing to an arbitrary sink, falling back to stderr.
    pub fn with_sink<W: Write + Send + 'static>(debug: bool, sink: W) -> Self {
        Self {
            debug,
            sink: Mutex::new(Box::new(sink)),
            fallback: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Replace the writer used when the primary sink fails.
    pub fn with_fallback<W: Write + Send + 'static>(mut self, fallback: W) -> Self {
        self.fallback = Mutex::new(Box::new(fallback));
        self
    }

    pub fn log(&self, file_name: &str, level: LogLevel, message: &str) {
        if level == LogLevel::Debug && !self.debug {
            return;
        }

        let line = format_line(file_name, level, message, None);
        let written = match self.sink.lock() {
            Ok(mut sink) => writeln!(sink, "{line}").and_then(|()| sink.flush()),
            Err(_) => Err(io::Error::other("log sink mutex poisoned")),
        };

        if let Err(e) = written {
            let details = format!("Error occurred at JobLogger::log: {e}");
            let line = format_line(file_name, level, message, Some(&details));
            // Nowhere left to report a failing fallback.
            if let Ok(mut fallback) = self.fallback.lock() {
                let _ = writeln!(fallback, "{line}");
            }
        }
    }

    pub fn info(&self, file_name: &str, message: &str) {
        self.log(file_name, LogLevel::Info, message);
    }

    pub fn error(&self, file_name: &str, message: &str) {
        self.log(file_name, LogLevel::Error, message);
    }

    pub fn debug(&self, file_name: &str, message: &str) {
        self.log(file_name, LogLevel::Debug, message);
    }
}
