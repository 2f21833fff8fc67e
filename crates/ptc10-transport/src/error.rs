/// Errors that can occur in controller transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Send or receive attempted without an open stream.
    #[error("transport not connected")]
    NotConnected,

    /// The controller closed the connection.
    #[error("connection closed by controller")]
    Closed,
}

impl TransportError {
    /// Whether this error leaves the stream in an unknown state.
    ///
    /// `NotConnected` is a usage error and says nothing about the stream.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Io(_) | TransportError::Closed)
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
