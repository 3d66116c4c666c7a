//! Incremental line splitting for newline-delimited streams.
//!
//! Both ends of a connection read raw bytes into a [`LineBuffer`] and pull
//! complete lines out of it. The buffer does no I/O itself; callers fill
//! [`LineBuffer::buffer_mut`] (typically with `read_buf`) and then drain
//! [`LineBuffer::next_line`] until it returns `None`.

use bytes::{Buf, BytesMut};

use crate::errors::{ProtocolError, Result};

/// Accumulates bytes and yields complete lines.
///
/// Lines are returned without their `\n` or `\r\n` terminator. Invalid UTF-8
/// is replaced rather than rejected, since payloads are opaque text.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    max_len: usize,
}

impl LineBuffer {
    /// Buffer accepting lines of at most `max_len` bytes, terminator included.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self { buf: BytesMut::with_capacity(max_len.min(8 * 1024)), max_len }
    }

    /// Bytes to append incoming data to.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Next complete line, or `None` if more data is needed.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooLarge` if a line exceeds the limit. The
    ///   buffered bytes are discarded; the stream should be considered
    ///   unusable.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        match self.buf.iter().position(|&b| b == b'\n') {
            Some(pos) if pos + 1 > self.max_len => self.overflow(pos + 1),
            Some(pos) => {
                let line = self.buf.split_to(pos + 1);
                Ok(Some(to_text(&line)))
            },
            None if self.buf.len() > self.max_len => self.overflow(self.buf.len()),
            None => Ok(None),
        }
    }

    /// Unterminated trailing data left at end of stream, if any.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(to_text(&rest))
    }

    fn overflow(&mut self, size: usize) -> Result<Option<String>> {
        self.buf.advance(self.buf.len());
        Err(ProtocolError::FrameTooLarge { size, max: self.max_len })
    }
}

fn to_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
