use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Target used by `TracingSink` for driver events.
pub const EVENTS_TARGET: &str = "ptc10::events";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `level` applies to everything; `events`, when set, overrides it for
/// driver events only.
pub fn log_filter(level: LogLevel, events: Option<LogLevel>) -> Targets {
    let filter = Targets::new().with_default(level.as_filter());
    match events {
        Some(events) => filter.with_target(EVENTS_TARGET, events.as_filter()),
        None => filter,
    }
}

/// Install the stderr subscriber. Driver events arrive here through
/// `TracingSink` under the `ptc10::events` target.
pub fn init_logging(format: LogFormat, level: LogLevel, events: Option<LogLevel>) {
    let layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .compact()
            .without_time()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(layer.with_filter(log_filter(level, events)))
        .try_init();
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn events_follow_global_level_by_default() {
        let filter = log_filter(LogLevel::Warn, None);
        assert!(filter.would_enable(EVENTS_TARGET, &Level::WARN));
        assert!(!filter.would_enable(EVENTS_TARGET, &Level::INFO));
        assert!(!filter.would_enable("ptc10_transport::tcp", &Level::INFO));
    }

    #[test]
    fn event_level_overrides_driver_events_only() {
        let filter = log_filter(LogLevel::Warn, Some(LogLevel::Debug));
        assert!(filter.would_enable(EVENTS_TARGET, &Level::DEBUG));
        assert!(!filter.would_enable(EVENTS_TARGET, &Level::TRACE));
        assert!(!filter.would_enable("ptc10_transport::tcp", &Level::INFO));

        let quiet = log_filter(LogLevel::Info, Some(LogLevel::Error));
        assert!(!quiet.would_enable(EVENTS_TARGET, &Level::WARN));
        assert!(quiet.would_enable("ptc10::cmd::poll", &Level::INFO));
    }
}
