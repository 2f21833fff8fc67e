use bytes::{BufMut, BytesMut};

use crate::error::{ProtocolError, Result};

/// Terminator appended to every command frame.
pub const TERMINATOR: u8 = b'\n';

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────────┬──────┐
/// │ ASCII command          │ \n   │
/// └────────────────────────┴──────┘
/// ```
///
/// A command must fit on one line; embedded `\n` or `\r` are rejected
/// because the controller would see them as two commands.
pub fn encode_command(command: &str, dst: &mut BytesMut) -> Result<()> {
    if command.contains(['\n', '\r']) {
        return Err(ProtocolError::EmbeddedNewline {
            command: command.escape_debug().to_string(),
        });
    }
    dst.reserve(command.len() + 1);
    dst.put_slice(command.as_bytes());
    dst.put_u8(TERMINATOR);
    Ok(())
}

/// Decode one reply frame.
///
/// The reply is whatever a single receive delivered. Surrounding
/// whitespace, including the terminator, is stripped.
pub fn decode_reply(raw: &[u8]) -> Result<String> {
    let text = String::from_utf8(raw.to_vec())?;
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_single_terminator() {
        let mut buf = BytesMut::new();
        encode_command("3A?", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"3A?\n");
    }

    #[test]
    fn encode_rejects_embedded_newline() {
        let mut buf = BytesMut::new();
        let err = encode_command("*IDN?\ngetOutput?", &mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::EmbeddedNewline { .. }));
        assert!(buf.is_empty());

        assert!(encode_command("Out1?\r", &mut buf).is_err());
    }

    #[test]
    fn encode_empty_command() {
        let mut buf = BytesMut::new();
        encode_command("", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"\n");
    }

    #[test]
    fn decode_strips_terminator_and_padding() {
        assert_eq!(decode_reply(b"23.5\r\n").unwrap(), "23.5");
        assert_eq!(decode_reply(b"  A2, Out1 \n").unwrap(), "A2, Out1");
        assert_eq!(decode_reply(b"\n").unwrap(), "");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode_reply(&[0x32, 0xFF, 0x0A]).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }
}
