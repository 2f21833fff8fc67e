mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ConnectionArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ptc10", version, about = "SRS PTC10 controller CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Minimum level for driver events (defaults to --log-level).
    #[arg(long, value_name = "LEVEL", global = true)]
    event_level: Option<LogLevel>,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.event_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.connection, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_subcommand() {
        let cli = Cli::try_parse_from([
            "ptc10",
            "--host",
            "10.0.0.5",
            "--port",
            "2323",
            "read",
            "Out 1",
        ])
        .expect("read args should parse");

        assert_eq!(cli.connection.host, "10.0.0.5");
        assert_eq!(cli.connection.port, 2323);
        assert!(matches!(cli.command, Command::Read(ref args) if args.channel == "Out 1"));
    }

    #[test]
    fn connection_args_are_global() {
        let cli = Cli::try_parse_from(["ptc10", "values", "--host", "ptc10.lab", "--timeout", "2s"])
            .expect("global args should parse after subcommand");

        assert_eq!(cli.connection.host, "ptc10.lab");
        assert_eq!(cli.connection.timeout.as_deref(), Some("2s"));
    }

    #[test]
    fn parses_poll_subcommand() {
        let cli = Cli::try_parse_from(["ptc10", "poll", "/etc/ptc10/poll.json", "--count", "3"])
            .expect("poll args should parse");
        assert!(matches!(cli.command, Command::Poll(ref args) if args.count == Some(3)));
    }

    #[test]
    fn parses_event_level() {
        let cli = Cli::try_parse_from(["ptc10", "names", "--event-level", "debug"])
            .expect("event level should parse");
        assert!(matches!(cli.event_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Cli::try_parse_from(["ptc10", "--format", "xml", "identify"])
            .expect_err("unknown format should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
