//! Byte-stream transport to a PTC10 controller.
//!
//! This is the lowest layer of ptc10. It owns exactly one connection,
//! moves raw bytes in both directions, and discards stale input right
//! after every (re)connect so the first real exchange starts clean.
//!
//! Everything else builds on the [`Transport`] trait defined here;
//! [`TcpTransport`] is the production implementation.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedTransport;
pub use tcp::{TcpConfig, TcpTransport, DEFAULT_MAX_CHUNK};
pub use traits::{ConnectOutcome, Transport};
