use ptc10_line::ProtocolError;
use ptc10_transport::TransportError;

/// Errors surfaced by driver operations.
///
/// Only structural failures appear here. Unreadable values are reported
/// as events and returned as NaN instead.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Connecting failed for a reason other than "already connected".
    #[error("failed to connect to {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        source: TransportError,
    },

    /// The stream failed during a query; the connection state is unknown.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// A protocol operation was rejected (not connected, bad command, bad reply text).
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    /// The requested feature is not available.
    #[error("{0}")]
    Unsupported(&'static str),
}

impl From<ProtocolError> for DriverError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Transport(err) => DriverError::Transport(err),
            other => DriverError::Protocol(other),
        }
    }
}

impl From<TransportError> for DriverError {
    fn from(err: TransportError) -> Self {
        DriverError::Transport(err)
    }
}

impl DriverError {
    /// Whether the error means the driver is not (or no longer) connected.
    pub fn is_disconnected(&self) -> bool {
        match self {
            DriverError::Connection { .. } => true,
            DriverError::Transport(err) => err.is_fatal(),
            DriverError::Protocol(ProtocolError::NotConnected) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_transport_errors_are_flattened() {
        let err: DriverError = ProtocolError::Transport(TransportError::Closed).into();
        assert!(matches!(err, DriverError::Transport(TransportError::Closed)));
        assert!(err.is_disconnected());
    }

    #[test]
    fn not_connected_is_a_protocol_error() {
        let err: DriverError = ProtocolError::NotConnected.into();
        assert!(matches!(err, DriverError::Protocol(ProtocolError::NotConnected)));
        assert!(err.is_disconnected());
        assert_eq!(err.to_string(), "protocol error: not connected to controller");
    }
}
