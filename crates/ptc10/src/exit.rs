use std::fmt;
use std::io;

use ptc10_driver::DriverError;
use ptc10_line::ProtocolError;
use ptc10_transport::TransportError;

// Process exit codes. Keep stable; scripts match on them.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => FAILURE,
        io::ErrorKind::InvalidInput | io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        TransportError::NotConnected => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    match err {
        ProtocolError::Transport(err) => transport_error(context, err),
        ProtocolError::EmbeddedNewline { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        ProtocolError::Decode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ProtocolError::NotConnected => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn driver_error(context: &str, err: DriverError) -> CliError {
    match err {
        DriverError::Connection { source, .. } => transport_error(context, source),
        DriverError::Transport(err) => transport_error(context, err),
        DriverError::Protocol(err) => protocol_error(context, err),
        DriverError::Unsupported(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_failure() {
        let err = DriverError::Connection {
            host: "127.0.0.1".to_string(),
            port: 23,
            source: TransportError::Connect {
                addr: "127.0.0.1:23".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        };
        assert_eq!(driver_error("connect failed", err).code, FAILURE);
    }

    #[test]
    fn read_timeout_maps_to_timeout() {
        let err = DriverError::Transport(TransportError::Io(io::Error::from(
            io::ErrorKind::WouldBlock,
        )));
        let cli = driver_error("query failed", err);
        assert_eq!(cli.code, TIMEOUT);
        assert!(cli.message.starts_with("query failed: "));
    }

    #[test]
    fn embedded_newline_is_usage() {
        let err = DriverError::Protocol(ProtocolError::EmbeddedNewline {
            command: "a\\nb".to_string(),
        });
        assert_eq!(driver_error("query failed", err).code, USAGE);
    }

    #[test]
    fn unsupported_is_usage() {
        let err = DriverError::Unsupported("serial connection not yet implemented");
        assert_eq!(driver_error("connect failed", err).code, USAGE);
    }

    #[test]
    fn controller_hangup_is_transport_error() {
        let err = DriverError::Transport(TransportError::Closed);
        assert_eq!(driver_error("query failed", err).code, TRANSPORT_ERROR);
    }
}
