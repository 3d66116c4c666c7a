//! Text frame carried over the wire.
//!
//! A `Frame` is one newline-terminated line with three `|`-separated fields:
//!
//! ```text
//! <client_id>|<address>|<payload>\n
//! ```
//!
//! There is no length prefix and no escaping. Decoding splits on the first two
//! `|` only, so the payload may itself contain `|`. The first two fields may
//! not, and no field may contain a line break; both are rejected when
//! encoding rather than silently producing a frame that decodes differently.

use bytes::BufMut;

use crate::{
    FIELD_SEPARATOR, MAX_FRAME_LEN,
    command::{Command, HELLO},
    errors::{ProtocolError, Result},
};

/// Complete client-to-server protocol frame.
///
/// # Invariants
///
/// - Field Count: a decoded frame always has exactly three fields, the third
///   holding everything after the second separator.
///
/// - Line Integrity: [`Frame::encode`] never emits a frame containing more than
///   one line break, and the break is always the final byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Identifier the client registered with (its username)
    pub client_id: String,

    /// Address the client reports for itself
    pub address: String,

    /// Command literal or arbitrary text to cache
    pub payload: String,
}

impl Frame {
    /// Create a frame from its three fields.
    ///
    /// No validation happens here; invalid fields are rejected by
    /// [`Frame::encode`].
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        address: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self { client_id: client_id.into(), address: address.into(), payload: payload.into() }
    }

    /// Handshake frame sent once, right after the socket opens.
    #[must_use]
    pub fn hello(client_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self::new(client_id, address, HELLO)
    }

    /// Classify the payload.
    #[must_use]
    pub fn command(&self) -> Command<'_> {
        Command::parse(&self.payload)
    }

    /// Size of the encoded frame including separators and the line break.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.client_id.len() + self.address.len() + self.payload.len() + 3
    }

    /// Encode the frame into `dst`, including the trailing line break.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidField` if `client_id` or `address` contains
    ///   `|`, or any field contains a line break
    /// - `ProtocolError::FrameTooLarge` if the encoded line exceeds
    ///   [`MAX_FRAME_LEN`]
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        self.validate()?;

        dst.put_slice(self.client_id.as_bytes());
        dst.put_u8(FIELD_SEPARATOR as u8);
        dst.put_slice(self.address.as_bytes());
        dst.put_u8(FIELD_SEPARATOR as u8);
        dst.put_slice(self.payload.as_bytes());
        dst.put_u8(b'\n');

        Ok(())
    }

    /// Encode the frame as a `String` (with trailing line break).
    pub fn to_line(&self) -> Result<String> {
        self.validate()?;

        let mut line = String::with_capacity(self.encoded_len());
        line.push_str(&self.client_id);
        line.push(FIELD_SEPARATOR);
        line.push_str(&self.address);
        line.push(FIELD_SEPARATOR);
        line.push_str(&self.payload);
        line.push('\n');

        Ok(line)
    }

    /// Decode one line into a frame.
    ///
    /// A single trailing `\n` or `\r\n` is stripped before splitting.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooLarge` if the line exceeds [`MAX_FRAME_LEN`]
    /// - `ProtocolError::MalformedFrame` if fewer than three fields are present
    pub fn decode(line: &str) -> Result<Self> {
        if line.len() > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameTooLarge { size: line.len(), max: MAX_FRAME_LEN });
        }

        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut fields = line.splitn(3, FIELD_SEPARATOR);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(client_id), Some(address), Some(payload)) => {
                Ok(Self::new(client_id, address, payload))
            },
            (Some(_), Some(_), None) => Err(ProtocolError::MalformedFrame { fields: 2 }),
            _ => Err(ProtocolError::MalformedFrame { fields: 1 }),
        }
    }

    fn validate(&self) -> Result<()> {
        check_header_field("client_id", &self.client_id)?;
        check_header_field("address", &self.address)?;
        if has_line_break(&self.payload) {
            return Err(ProtocolError::InvalidField {
                field: "payload",
                reason: "contains a line break",
            });
        }

        let size = self.encoded_len();
        if size > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameTooLarge { size, max: MAX_FRAME_LEN });
        }

        Ok(())
    }
}

fn check_header_field(field: &'static str, value: &str) -> Result<()> {
    if value.contains(FIELD_SEPARATOR) {
        return Err(ProtocolError::InvalidField { field, reason: "contains '|'" });
    }
    if has_line_break(value) {
        return Err(ProtocolError::InvalidField { field, reason: "contains a line break" });
    }
    Ok(())
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\n', '\r'])
}
