//! Driver for SRS PTC10 temperature/process controllers.
//!
//! A PTC10 speaks a line-delimited ASCII protocol over TCP. This crate
//! connects to one, validates channel names, and reads channel values.
//!
//! ```no_run
//! use ptc10::Ptc10;
//!
//! let mut ptc = Ptc10::new();
//! ptc.connect("192.168.29.154", 23)?;
//! println!("{}", ptc.identify()?);
//! for (name, value) in ptc.get_named_output_dict()? {
//!     println!("{name}: {value}");
//! }
//! ptc.disconnect();
//! # Ok::<(), ptc10::DriverError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte-stream transport (TCP) with post-connect drain
//! - [`line`]: Newline-framed command/reply exchange
//! - [`driver`]: Channel registry, value accessors, event sinks

/// Re-export transport types.
pub mod transport {
    pub use ptc10_transport::*;
}

/// Re-export line protocol types.
pub mod line {
    pub use ptc10_line::*;
}

/// Re-export driver types.
pub mod driver {
    pub use ptc10_driver::*;
}

pub use ptc10_driver::{
    ConnectionKind, ConsoleSink, DriverError, EventSink, FileSink, NamedOutputs, NullSink, Ptc10,
    Ptc10Builder, Severity, TracingSink,
};
