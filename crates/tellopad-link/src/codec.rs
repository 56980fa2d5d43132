//! Command encoding.
//!
//! Both controller-driven and operator-typed commands pass through [`encode`]
//! before reaching the socket, and inbound datagrams go through [`decode`].

use std::fmt::Write;

use tellopad_types::{Command, TelloError};

/// Wire bytes for `command`: its UTF-8 encoding, no terminator.
pub fn encode(command: &Command) -> Vec<u8> {
    command.as_str().as_bytes().to_vec()
}

/// Lowercase hex rendering of `bytes`, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Decode an inbound datagram as UTF-8 text.
///
/// # Errors
///
/// Returns [`TelloError::Decode`] when the payload is not valid UTF-8.
pub fn decode(payload: &[u8]) -> Result<String, TelloError> {
    String::from_utf8(payload.to_vec())
        .map_err(|e| TelloError::Decode(format!("response is not UTF-8: {e}")))
}
