use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use ptc10_driver::{FileSink, Ptc10, Ptc10Builder};

use crate::exit::{driver_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod channels;
pub mod identify;
pub mod poll;
pub mod query;
pub mod read;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the controller identification string.
    Identify,
    /// Read one channel by name.
    Read(ReadArgs),
    /// List channel names in controller order.
    Names,
    /// Read all channel values in controller order.
    Values,
    /// Read all channels as a name to value mapping.
    Outputs,
    /// Send one raw command and print the reply.
    Query(QueryArgs),
    /// Poll configured channels at a fixed interval and emit telemetry points.
    Poll(PollArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Identify => identify::run(conn, format),
        Command::Read(args) => read::run(args, conn, format),
        Command::Names => channels::names(conn, format),
        Command::Values => channels::values(conn, format),
        Command::Outputs => channels::outputs(conn, format),
        Command::Query(args) => query::run(args, conn, format),
        Command::Poll(args) => poll::run(args, conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// Controller connection options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Controller host name or address.
    #[arg(long, env = "PTC10_HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,
    /// Controller TCP port.
    #[arg(long, env = "PTC10_PORT", default_value_t = 23, global = true)]
    pub port: u16,
    /// Connect and per-reply timeout (e.g. 5s, 500ms). Default: wait indefinitely.
    #[arg(long, global = true)]
    pub timeout: Option<String>,
    /// Append driver events to this file instead of the log output.
    #[arg(long, value_name = "FILE", global = true)]
    pub event_log: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Channel name (e.g. 3A, Out1).
    pub channel: String,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Command text, without the line terminator (e.g. *IDN?).
    pub command: String,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// JSON poller configuration file.
    pub config: PathBuf,
    /// Stop after N polling iterations.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build a disconnected driver from the connection options.
pub fn build_driver(conn: &ConnectionArgs, timeout: Option<Duration>) -> CliResult<Ptc10> {
    let mut builder = Ptc10Builder::new();
    if let Some(timeout) = timeout {
        builder = builder
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .write_timeout(timeout);
    }
    if let Some(path) = &conn.event_log {
        let sink = FileSink::open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
        builder = builder.sink(sink);
    }
    Ok(builder.build())
}

/// Build a driver and connect it to `--host`/`--port`.
pub fn connect_driver(conn: &ConnectionArgs) -> CliResult<Ptc10> {
    let timeout = conn.timeout.as_deref().map(parse_duration).transpose()?;
    let mut driver = build_driver(conn, timeout)?;
    driver
        .connect(&conn.host, conn.port)
        .map_err(|err| driver_error("connect failed", err))?;
    Ok(driver)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
