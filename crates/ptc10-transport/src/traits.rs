use bytes::Bytes;

use crate::error::Result;

/// Result of a successful [`Transport::connect`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new stream was opened.
    Connected,
    /// A stream was already open; nothing was reopened.
    AlreadyConnected,
}

/// A single bidirectional byte stream to one controller.
///
/// States are Disconnected and Connected. `connect` moves to Connected
/// (or stays there), `disconnect` moves to Disconnected. Implementations
/// must drain buffered input after every successful `connect`, including
/// the already-connected case.
pub trait Transport: Send {
    /// Open the stream if none exists, then drain stale input.
    fn connect(&mut self, host: &str, port: u16) -> Result<ConnectOutcome>;

    /// Close the stream.
    ///
    /// Returns `Ok(false)` if there was nothing to close. The stream is
    /// released even when shutting it down reports an error.
    fn disconnect(&mut self) -> Result<bool>;

    /// Whether a usable stream is currently held.
    fn is_connected(&self) -> bool;

    /// Write all bytes (blocking).
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until one chunk of bytes is available and return it.
    fn receive(&mut self) -> Result<Bytes>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self, host: &str, port: u16) -> Result<ConnectOutcome> {
        (**self).connect(host, port)
    }

    fn disconnect(&mut self) -> Result<bool> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self) -> Result<Bytes> {
        (**self).receive()
    }
}
