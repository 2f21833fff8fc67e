//! Device driver for SRS PTC10 temperature/process controllers.
//!
//! This is the layer applications use. Connect, then read channel values
//! by name or in bulk. Channel names are validated against a cached list
//! fetched from the controller, and unreadable values come back as NaN
//! with an error event instead of aborting the read.

pub mod connector;
pub mod driver;
pub mod error;
pub mod events;
pub mod registry;
pub mod values;

pub use connector::{ConnectionKind, Ptc10Builder};
pub use driver::Ptc10;
pub use error::{DriverError, Result};
pub use events::{
    ConsoleSink, EventSink, FileSink, NullSink, Severity, TracingSink,
};
#[cfg(any(test, feature = "mock"))]
pub use events::RecordingSink;
pub use ptc10_transport::{ConnectOutcome, TcpConfig};
pub use registry::ChannelRegistry;
pub use values::{NamedOutputs, ValueParseError};
