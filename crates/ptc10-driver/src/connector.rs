use std::time::Duration;

use ptc10_transport::{TcpConfig, TcpTransport, Transport};

use crate::driver::Ptc10;
use crate::events::{EventSink, TracingSink};

/// How the driver reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionKind {
    /// Ethernet (TCP) connection.
    #[default]
    Tcp,
    /// RS-232 connection. Not implemented.
    Serial,
}

/// Builder for a [`Ptc10`] driver.
pub struct Ptc10Builder {
    tcp: TcpConfig,
    sink: Box<dyn EventSink>,
}

impl Default for Ptc10Builder {
    fn default() -> Self {
        Self {
            tcp: TcpConfig::default(),
            sink: Box::new(TracingSink),
        }
    }
}

impl Ptc10Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where driver events are reported. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace all TCP socket options.
    pub fn tcp_config(mut self, config: TcpConfig) -> Self {
        self.tcp = config;
        self
    }

    /// Bound on establishing the TCP connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.tcp.connect_timeout = Some(timeout);
        self
    }

    /// Bound on waiting for each reply. Without one, a silent controller
    /// blocks the calling thread indefinitely.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.tcp.read_timeout = Some(timeout);
        self
    }

    /// Bound on each command write.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.tcp.write_timeout = Some(timeout);
        self
    }

    /// Build a disconnected driver using TCP.
    pub fn build(self) -> Ptc10<TcpTransport> {
        Ptc10::from_parts(TcpTransport::with_config(self.tcp), self.sink)
    }

    /// Build a disconnected driver over a caller-supplied transport.
    ///
    /// TCP options set on the builder are ignored.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Ptc10<T> {
        Ptc10::from_parts(transport, self.sink)
    }
}

impl std::fmt::Debug for Ptc10Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ptc10Builder")
            .field("tcp", &self.tcp)
            .finish_non_exhaustive()
    }
}
