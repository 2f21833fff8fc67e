use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{ConnectOutcome, Transport};

/// Default receive chunk size. One reply is whatever one read delivers.
pub const DEFAULT_MAX_CHUNK: usize = 4096;

const DRAIN_CHUNK_SIZE: usize = 1024;

/// Socket options applied to every new TCP stream.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Bound on establishing the connection. `None` or zero uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Bound on each blocking receive. `None` or zero blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Bound on each blocking send. `None` or zero blocks indefinitely.
    pub write_timeout: Option<Duration>,
    /// Largest chunk returned by a single receive.
    pub max_chunk_size: usize,
    /// Disable Nagle's algorithm.
    pub nodelay: bool,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            max_chunk_size: DEFAULT_MAX_CHUNK,
            nodelay: true,
        }
    }
}

/// TCP transport to a controller.
///
/// Holds at most one stream. The stream is present exactly when the
/// transport is connected.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a disconnected transport with default configuration.
    pub fn new() -> Self {
        Self::with_config(TcpConfig::default())
    }

    /// Create a disconnected transport with explicit configuration.
    pub fn with_config(config: TcpConfig) -> Self {
        Self {
            stream: None,
            config,
        }
    }

    /// Current transport configuration.
    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    /// Address of the connected controller, if any.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }

    fn open(&self, host: &str, port: u16) -> std::io::Result<TcpStream> {
        if host.trim().is_empty() {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "host must not be empty",
            ));
        }

        let stream = match nonzero(self.config.connect_timeout) {
            None => TcpStream::connect((host, port))?,
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in (host, port).to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(err) => last_err = Some(err),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(last_err.unwrap_or_else(|| {
                            std::io::Error::new(
                                ErrorKind::NotFound,
                                "host resolved to no addresses",
                            )
                        }))
                    }
                }
            }
        };

        stream.set_read_timeout(nonzero(self.config.read_timeout))?;
        stream.set_write_timeout(nonzero(self.config.write_timeout))?;
        stream.set_nodelay(self.config.nodelay)?;
        Ok(stream)
    }

    /// Drain the held stream, dropping it if the drain fails.
    fn drain_or_drop(&mut self) -> Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        match drain(stream) {
            Ok(discarded) => {
                if discarded > 0 {
                    debug!(bytes = discarded, "discarded stale input");
                }
                Ok(())
            }
            Err(err) => {
                self.stream = None;
                Err(TransportError::Io(err))
            }
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<ConnectOutcome> {
        if self.stream.is_some() {
            info!(host, port, "already connected");
            self.drain_or_drop()?;
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        let stream = self.open(host, port).map_err(|source| TransportError::Connect {
            addr: format!("{host}:{port}"),
            source,
        })?;
        info!(host, port, "connected to controller");

        self.stream = Some(stream);
        self.drain_or_drop()?;
        Ok(ConnectOutcome::Connected)
    }

    fn disconnect(&mut self) -> Result<bool> {
        let Some(stream) = self.stream.take() else {
            return Ok(false);
        };
        debug!("closing connection to controller");
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(true),
            // The peer already went away; the socket is released either way.
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(true),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let mut offset = 0usize;
        while offset < bytes.len() {
            match stream.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match stream.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn receive(&mut self) -> Result<Bytes> {
        let chunk_size = self.config.max_chunk_size.max(1);
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let mut chunk = vec![0u8; chunk_size];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    chunk.truncate(n);
                    return Ok(Bytes::from(chunk));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

/// A zero timeout means "no timeout"; the socket API rejects `Some(ZERO)`.
fn nonzero(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}

/// Read and discard everything immediately available on `stream`.
///
/// The stream is switched to non-blocking mode for the duration and
/// restored to blocking mode before returning.
fn drain(stream: &mut TcpStream) -> std::io::Result<usize> {
    stream.set_nonblocking(true)?;

    let mut discarded = 0usize;
    let mut buf = [0u8; DRAIN_CHUNK_SIZE];
    let outcome = loop {
        match stream.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => discarded += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    let restored = stream.set_nonblocking(false);
    outcome?;
    restored?;
    Ok(discarded)
}
