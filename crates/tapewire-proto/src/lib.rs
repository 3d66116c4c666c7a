//! Tapewire wire protocol.
//!
//! Newline-delimited text frames exchanged between Tapewire clients and the
//! relay server. Clients send [`Frame`]s (`client_id|address|payload`); the
//! server answers with bare lines drawn from the reserved literals in
//! [`command`] or with the cached payload itself.
//!
//! # Components
//!
//! - [`Frame`]: client-to-server frame with encode/decode
//! - [`Command`]: classification of a frame payload
//! - [`ServerMessage`]: classification of a server line
//! - [`LineBuffer`]: splits a byte stream into lines
//! - [`ProtocolError`]: codec failures

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
mod errors;
mod frame;
mod line;

pub use command::{Command, ServerMessage};
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use line::LineBuffer;

/// Separator between the three frame fields.
pub const FIELD_SEPARATOR: char = '|';

/// Maximum encoded size of a single line, line break included.
pub const MAX_FRAME_LEN: usize = 64 * 1024;
