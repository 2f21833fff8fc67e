//! Line-delimited ASCII command protocol for PTC10 controllers.
//!
//! Every command is one line of ASCII text terminated by `\n`. The
//! controller answers each command with exactly one reply; there is no
//! length prefix and no checksum, so the exchange is strictly half-duplex:
//! - one command frame out
//! - one reply frame back, taken from a single receive
//!
//! [`LineSession::query`] is the only primitive the driver layer uses.

pub mod codec;
pub mod command;
pub mod error;
pub mod session;

pub use codec::{decode_reply, encode_command, TERMINATOR};
pub use command::{channel_query, GET_OUTPUT, GET_OUTPUT_NAMES, IDENTIFY, NAN_TOKEN};
pub use error::{ProtocolError, Result};
pub use session::LineSession;
