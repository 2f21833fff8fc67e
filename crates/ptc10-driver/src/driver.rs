use ptc10_line::{channel_query, LineSession, GET_OUTPUT, GET_OUTPUT_NAMES, IDENTIFY};
use ptc10_transport::{ConnectOutcome, TcpTransport, Transport};

use crate::connector::{ConnectionKind, Ptc10Builder};
use crate::error::{DriverError, Result};
use crate::events::{EventSink, Severity, TracingSink};
use crate::registry::{parse_channel_names, ChannelRegistry};
use crate::values::{parse_output_fields, parse_value, NamedOutputs};

const SERIAL_UNSUPPORTED: &str = "serial connection not yet implemented";

/// Driver for one SRS PTC10 controller.
///
/// Owns its transport and channel registry; nothing is shared between
/// instances. All operations block until the controller replies or the
/// connection fails. Operations take `&mut self`, so a query's command and
/// reply are never interleaved with another query on the same driver.
pub struct Ptc10<T = TcpTransport> {
    session: LineSession<T>,
    registry: ChannelRegistry,
    sink: Box<dyn EventSink>,
}

impl Ptc10<TcpTransport> {
    /// A disconnected TCP driver reporting events to `tracing`.
    pub fn new() -> Self {
        Ptc10Builder::new().build()
    }

    pub fn builder() -> Ptc10Builder {
        Ptc10Builder::new()
    }
}

impl Default for Ptc10<TcpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Ptc10<T> {
    /// A disconnected driver over an explicit transport and sink.
    pub fn with_transport(transport: T, sink: impl EventSink + 'static) -> Self {
        Self::from_parts(transport, Box::new(sink))
    }

    pub(crate) fn from_parts(transport: T, sink: Box<dyn EventSink>) -> Self {
        Self {
            session: LineSession::new(transport),
            registry: ChannelRegistry::new(),
            sink,
        }
    }

    fn report(&self, severity: Severity, message: &str) {
        self.sink.report(severity, message);
    }

    /// Connect over TCP. See [`Ptc10::connect_with`].
    pub fn connect(&mut self, host: &str, port: u16) -> Result<ConnectOutcome> {
        self.connect_with(ConnectionKind::Tcp, host, port)
    }

    /// Connect to the controller.
    ///
    /// Connecting while already connected succeeds and only drains stale
    /// input. Any other failure leaves the driver disconnected, is
    /// reported as an error event, and is returned.
    pub fn connect_with(
        &mut self,
        kind: ConnectionKind,
        host: &str,
        port: u16,
    ) -> Result<ConnectOutcome> {
        if kind == ConnectionKind::Serial {
            self.report(Severity::Error, SERIAL_UNSUPPORTED);
            return Err(DriverError::Unsupported(SERIAL_UNSUPPORTED));
        }

        match self.session.get_mut().connect(host, port) {
            Ok(ConnectOutcome::Connected) => {
                self.report(Severity::Info, &format!("connected to {host}:{port}"));
                Ok(ConnectOutcome::Connected)
            }
            Ok(ConnectOutcome::AlreadyConnected) => {
                self.report(Severity::Info, "already connected");
                Ok(ConnectOutcome::AlreadyConnected)
            }
            Err(source) => {
                self.report(Severity::Error, &format!("connection error: {source}"));
                Err(DriverError::Connection {
                    host: host.to_string(),
                    port,
                    source,
                })
            }
        }
    }

    /// Close the connection.
    ///
    /// Never fails: closing while disconnected is reported as a warning,
    /// and a failure while closing is reported as an error. The driver is
    /// disconnected afterwards in every case.
    pub fn disconnect(&mut self) {
        match self.session.get_mut().disconnect() {
            Ok(true) => self.report(Severity::Info, "closed connection to controller"),
            Ok(false) => self.report(
                Severity::Warning,
                "disconnect requested but controller is not connected",
            ),
            Err(err) => self.report(
                Severity::Error,
                &format!("failed to close connection cleanly: {err}"),
            ),
        }
    }

    /// Liveness flag.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Send a raw command and return the reply.
    ///
    /// A transport failure leaves the stream in an unknown state, so the
    /// driver drops the connection before returning the error.
    pub fn query(&mut self, command: &str) -> Result<String> {
        match self.session.query(command) {
            Ok(reply) => Ok(reply),
            Err(err) => {
                if err.is_fatal() {
                    self.report(Severity::Error, &format!("connection lost: {err}"));
                    // Already broken; the shutdown outcome adds nothing.
                    let _ = self.session.get_mut().disconnect();
                }
                Err(err.into())
            }
        }
    }

    /// Device identification string, unmodified.
    pub fn identify(&mut self) -> Result<String> {
        let id = self.query(IDENTIFY)?;
        self.report(Severity::Info, &format!("device identification: {id}"));
        Ok(id)
    }

    /// Fetch channel names from the controller.
    ///
    /// Always queries; the cached registry is left untouched.
    pub fn get_channel_names(&mut self) -> Result<Vec<String>> {
        let reply = self.query(GET_OUTPUT_NAMES)?;
        let names = parse_channel_names(&reply);
        self.report(Severity::Debug, &format!("channel names: {names:?}"));
        Ok(names)
    }

    /// Re-fetch channel names and replace the cached registry.
    pub fn refresh_channel_names(&mut self) -> Result<Vec<String>> {
        let names = self.get_channel_names()?;
        self.registry.store(names.clone());
        Ok(names)
    }

    /// Cached channel names, `None` until first fetched.
    pub fn cached_channel_names(&self) -> Option<&[String]> {
        self.registry.names()
    }

    fn ensure_registry(&mut self) -> Result<()> {
        if !self.registry.is_populated() {
            self.refresh_channel_names()?;
        }
        Ok(())
    }

    /// Whether `channel` is one of the controller's channel names.
    ///
    /// Fetches and caches the names on first use. Never fails: if the
    /// fetch fails, the failure is reported and the name is treated as
    /// invalid; the next call fetches again.
    pub fn validate_channel_name(&mut self, channel: &str) -> bool {
        if let Err(err) = self.ensure_registry() {
            self.report(
                Severity::Error,
                &format!("could not fetch channel names: {err}"),
            );
            return false;
        }
        self.registry.contains(channel)
    }

    /// Current value of one channel.
    ///
    /// Returns NaN, with an error event, for an unknown channel name
    /// (nothing is sent) or a reply that is not a number. Only structural
    /// failures are returned as errors.
    pub fn get_channel_value(&mut self, channel: &str) -> Result<f64> {
        self.ensure_registry()?;
        if !self.registry.contains(channel) {
            self.report(
                Severity::Error,
                &format!("invalid channel name: {channel}"),
            );
            return Ok(f64::NAN);
        }
        self.report(
            Severity::Debug,
            &format!("channel name validated: {channel}"),
        );

        let reply = self.query(&channel_query(channel))?;
        match parse_value(&reply) {
            Ok(value) => {
                self.report(Severity::Debug, &format!("channel {channel} value: {value}"));
                Ok(value)
            }
            Err(_) => {
                self.report(
                    Severity::Error,
                    &format!("invalid float returned for channel {channel}: {reply}"),
                );
                Ok(f64::NAN)
            }
        }
    }

    /// Current values of all channels, aligned with [`Ptc10::get_channel_names`].
    ///
    /// `NaN` from the controller and unparseable fields both become NaN;
    /// the latter is reported as an error event.
    pub fn get_all_values(&mut self) -> Result<Vec<f64>> {
        let reply = self.query(GET_OUTPUT)?;
        let mut values = Vec::new();
        for (index, field) in parse_output_fields(&reply).into_iter().enumerate() {
            match field {
                Ok(value) => values.push(value),
                Err(err) => {
                    self.report(
                        Severity::Error,
                        &format!("invalid float in output field {index}: {err}"),
                    );
                    values.push(f64::NAN);
                }
            }
        }
        self.report(Severity::Debug, &format!("output values: {values:?}"));
        Ok(values)
    }

    /// Channel name to value mapping.
    ///
    /// Names and values come from two separate queries and are paired
    /// positionally up to the shorter list. A length mismatch is reported
    /// as a warning.
    pub fn get_named_output_dict(&mut self) -> Result<NamedOutputs> {
        let names = self.get_channel_names()?;
        let values = self.get_all_values()?;
        if names.len() != values.len() {
            self.report(
                Severity::Warning,
                &format!(
                    "channel name count ({}) differs from value count ({}); pairing the first {}",
                    names.len(),
                    values.len(),
                    names.len().min(values.len())
                ),
            );
        }
        let outputs = NamedOutputs::zip(names, values);
        self.report(Severity::Debug, &format!("named outputs: {outputs:?}"));
        Ok(outputs)
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        self.session.get_ref()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Ptc10<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ptc10")
            .field("session", &self.session)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
