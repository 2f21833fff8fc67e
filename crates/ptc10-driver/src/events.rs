//! Event reporting.
//!
//! The driver reports lifecycle and data-quality events through an
//! [`EventSink`] chosen at construction. Where the events end up is the
//! embedding application's decision.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for driver events.
///
/// Reporting never fails from the driver's point of view; a sink that
/// cannot deliver an event drops it.
pub trait EventSink: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn report(&self, severity: Severity, message: &str) {
        (**self).report(severity, message)
    }
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(target: "ptc10::events", "{message}"),
            Severity::Info => tracing::info!(target: "ptc10::events", "{message}"),
            Severity::Warning => tracing::warn!(target: "ptc10::events", "{message}"),
            Severity::Error => tracing::error!(target: "ptc10::events", "{message}"),
        }
    }
}

/// Prints events: debug and info to stdout, warnings and errors to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    min_severity: Severity,
}

impl ConsoleSink {
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl EventSink for ConsoleSink {
    fn report(&self, severity: Severity, message: &str) {
        if severity < self.min_severity {
            return;
        }
        match severity {
            Severity::Debug | Severity::Info => println!("[{severity}] {message}"),
            Severity::Warning | Severity::Error => eprintln!("[{severity}] {message}"),
        }
    }
}

/// Appends one timestamped line per event to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The file events are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for FileSink {
    fn report(&self, severity: Severity, message: &str) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let _ = writeln!(file, "{timestamp:.3} {severity} {message}");
        let _ = file.flush();
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn report(&self, _severity: Severity, _message: &str) {}
}

/// Keeps every event in memory. Clones share the same record.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<(Severity, String)>>>,
}

#[cfg(any(test, feature = "mock"))]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, oldest first.
    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at exactly `severity`.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl EventSink for RecordingSink {
    fn report(&self, severity: Severity, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((severity, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_importance() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Warning.to_string(), "WARNING");
    }

    #[test]
    fn recording_sink_shares_events_between_clones() {
        let sink = RecordingSink::new();
        let handle = sink.clone();

        sink.report(Severity::Info, "connected");
        sink.report(Severity::Error, "invalid channel name: 9Z");

        assert_eq!(handle.events().len(), 2);
        assert_eq!(
            handle.messages(Severity::Error),
            vec!["invalid channel name: 9Z".to_string()]
        );

        handle.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn file_sink_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "ptc10-events-{}-{}.log",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));

        {
            let sink = FileSink::open(&path).unwrap();
            assert_eq!(sink.path(), path.as_path());
            sink.report(Severity::Info, "connected to 10.0.0.5:23");
            sink.report(Severity::Warning, "already disconnected");
        }
        {
            let sink = FileSink::open(&path).unwrap();
            sink.report(Severity::Error, "connection lost");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("INFO connected to 10.0.0.5:23"));
        assert!(lines[1].ends_with("WARNING already disconnected"));
        assert!(lines[2].ends_with("ERROR connection lost"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn null_and_console_sinks_accept_events() {
        NullSink.report(Severity::Error, "dropped");
        ConsoleSink::new(Severity::Error).report(Severity::Debug, "filtered");
        TracingSink.report(Severity::Info, "forwarded");
    }
}
