use bytes::BytesMut;
use ptc10_transport::Transport;
use tracing::debug;

use crate::codec::{decode_reply, encode_command};
use crate::error::{ProtocolError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Half-duplex command/reply exchange over a [`Transport`].
///
/// Every method takes `&mut self`, so one query's send and receive can
/// never interleave with another query on the same session. Share a
/// session across threads by wrapping its owner in a `Mutex` and holding
/// the lock for the whole query.
#[derive(Debug)]
pub struct LineSession<T> {
    transport: T,
    buf: BytesMut,
}

impl<T: Transport> LineSession<T> {
    /// Wrap a transport. The transport may still be disconnected.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Whether the underlying transport holds a usable stream.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Send one command frame (the terminator is appended here).
    pub fn send_command(&mut self, command: &str) -> Result<()> {
        if !self.transport.is_connected() {
            return Err(ProtocolError::NotConnected);
        }

        self.buf.clear();
        encode_command(command, &mut self.buf)?;

        debug!(command, "sending");
        self.transport.send(&self.buf)?;
        Ok(())
    }

    /// Receive one reply frame, stripped of surrounding whitespace.
    pub fn read_reply(&mut self) -> Result<String> {
        if !self.transport.is_connected() {
            return Err(ProtocolError::NotConnected);
        }

        let raw = self.transport.receive()?;
        let reply = decode_reply(&raw)?;
        debug!(reply = %reply, "received");
        Ok(reply)
    }

    /// Send a command and return the immediate reply.
    pub fn query(&mut self, command: &str) -> Result<String> {
        self.send_command(command)?;
        self.read_reply()
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}
