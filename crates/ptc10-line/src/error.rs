use ptc10_transport::TransportError;

/// Errors that can occur while exchanging command and reply frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A protocol operation was attempted without a connection.
    #[error("not connected to controller")]
    NotConnected,

    /// The command would span more than one frame.
    #[error("command contains an embedded newline: {command}")]
    EmbeddedNewline { command: String },

    /// The reply was not valid UTF-8 text.
    #[error("reply is not valid text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    /// Whether the connection is now in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::Transport(err) if err.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
