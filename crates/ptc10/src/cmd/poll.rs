use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ptc10_driver::Ptc10;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::cmd::{build_driver, parse_duration, ConnectionArgs, PollArgs};
use crate::exit::{driver_error, io_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS, USAGE};
use crate::output::{json_value, now_unix_seconds, OutputFormat};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Poller configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub device_host: String,
    pub device_port: u16,
    pub interval_secs: f64,
    #[serde(skip)]
    interval: Duration,
    #[serde(default)]
    pub verbose: Option<Verbosity>,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default, alias = "db_channel")]
    pub tag_channel: Option<String>,
    /// Channels in file order; points are emitted in this order.
    #[serde(deserialize_with = "channels_in_file_order")]
    pub log_channels: Vec<(String, ChannelSpec)>,
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSpec {
    pub field: String,
    pub units: String,
}

/// `verbose` is accepted as a boolean or as `0`/`1`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Verbosity {
    Flag(bool),
    Level(u8),
}

impl Verbosity {
    pub fn enabled(self) -> bool {
        match self {
            Verbosity::Flag(flag) => flag,
            Verbosity::Level(level) => level > 0,
        }
    }
}

fn default_measurement() -> String {
    "srs_ptc10".to_string()
}

fn channels_in_file_order<'de, D>(deserializer: D) -> Result<Vec<(String, ChannelSpec)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ChannelsVisitor;

    impl<'de> Visitor<'de> for ChannelsVisitor {
        type Value = Vec<(String, ChannelSpec)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of channel name to {field, units}")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut channels: Vec<(String, ChannelSpec)> = Vec::new();
            while let Some((name, spec)) = map.next_entry::<String, ChannelSpec>()? {
                match channels.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(entry) => entry.1 = spec,
                    None => channels.push((name, spec)),
                }
            }
            Ok(channels)
        }
    }

    deserializer.deserialize_map(ChannelsVisitor)
}

impl PollConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        Self::parse(&text)
            .map_err(|err| CliError::new(DATA_INVALID, format!("{}: {err}", path.display())))
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let mut config: PollConfig =
            serde_json::from_str(text).map_err(|err| err.to_string())?;
        config.interval = Duration::try_from_secs_f64(config.interval_secs).map_err(|_| {
            format!(
                "interval_secs must be a non-negative number of seconds, got {}",
                config.interval_secs
            )
        })?;
        if config.read_timeout_ms == Some(0) {
            return Err("read_timeout_ms must be greater than zero".to_string());
        }
        Ok(config)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.is_some_and(Verbosity::enabled)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// One telemetry point per channel per iteration.
#[derive(Debug, Serialize)]
pub struct Point<'a> {
    pub measurement: &'a str,
    pub fields: BTreeMap<&'a str, Option<f64>>,
    pub tags: BTreeMap<&'static str, &'a str>,
    pub timestamp: f64,
}

impl<'a> Point<'a> {
    pub fn new(config: &'a PollConfig, spec: &'a ChannelSpec, value: f64, timestamp: f64) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(spec.field.as_str(), json_value(value));

        let mut tags = BTreeMap::new();
        tags.insert("units", spec.units.as_str());
        if let Some(channel) = &config.tag_channel {
            tags.insert("channel", channel.as_str());
        }

        Self {
            measurement: &config.measurement,
            fields,
            tags,
            timestamp,
        }
    }
}

pub fn run(args: PollArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let config = PollConfig::load(&args.config)?;
    if config.log_channels.is_empty() {
        return Err(CliError::new(
            USAGE,
            format!("{}: log_channels is empty", args.config.display()),
        ));
    }
    let verbose = config.verbose();

    let mut timeout = conn.timeout.as_deref().map(parse_duration).transpose()?;
    if let Some(ms) = config.read_timeout_ms {
        timeout = Some(Duration::from_millis(ms));
    }
    let mut driver = build_driver(conn, timeout)?;

    if verbose {
        info!(host = %config.device_host, port = config.device_port, "connecting to controller");
    }
    driver
        .connect(&config.device_host, config.device_port)
        .map_err(|err| driver_error("connect failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut iterations = 0u64;
    while running.load(Ordering::SeqCst) {
        poll_once(&mut driver, &config, format, verbose);
        iterations += 1;

        if args.count.is_some_and(|count| iterations >= count) {
            break;
        }

        if verbose {
            info!(interval_secs = config.interval_secs, "waiting for next poll");
        }
        sleep_while_running(config.interval(), &running);
    }

    info!(iterations, "stopping telemetry poller");
    driver.disconnect();
    Ok(SUCCESS)
}

/// One iteration. Failures are logged and retried on the next interval.
fn poll_once(driver: &mut Ptc10, config: &PollConfig, format: OutputFormat, verbose: bool) {
    if !driver.is_connected() {
        warn!(host = %config.device_host, port = config.device_port, "controller connection lost, reconnecting");
        if let Err(err) = driver.connect(&config.device_host, config.device_port) {
            warn!(error = %err, "reconnect failed, will retry");
            return;
        }
    }

    for (channel, spec) in &config.log_channels {
        let value = match driver.get_channel_value(channel) {
            Ok(value) => value,
            Err(err) => {
                warn!(channel = %channel, error = %err, "poll iteration failed, will retry");
                return;
            }
        };

        let point = Point::new(config, spec, value, now_unix_seconds());
        let line = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&point),
            _ => serde_json::to_string(&point),
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(channel = %channel, error = %err, "failed encoding point"),
        }
        if verbose {
            info!(channel = %channel, field = %spec.field, value, "point emitted");
        }
    }
}

/// Sleep for `total`, waking early once `running` is cleared. An interval
/// too long to represent as a deadline sleeps until interrupted.
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now().checked_add(total);
    while running.load(Ordering::SeqCst) {
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                SLEEP_SLICE.min(deadline - now)
            }
            None => SLEEP_SLICE,
        };
        std::thread::sleep(slice);
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
