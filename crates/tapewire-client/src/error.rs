//! Client error types.

use std::io;

use tapewire_proto::ProtocolError;
use thiserror::Error;

/// Errors returned by [`crate::ClientEngine`] operations.
///
/// Failures of the background receive task are not errors; they surface as
/// [`crate::ClientEvent::StatusChanged`] events.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Port text is not a number in 0-65535
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    /// TCP connection could not be established (refused, unreachable, or
    /// timed out)
    #[error("cannot connect to {address}: {reason}")]
    Connection {
        /// `host:port` that was tried
        address: String,
        /// What went wrong
        reason: String,
    },

    /// Operation needs an open connection
    #[error("not connected")]
    NotConnected,

    /// `connect` called while a connection is open
    #[error("already connected")]
    AlreadyConnected,

    /// Frame could not be encoded (client id or address contains `|` or a
    /// line break, or the payload is too large)
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Socket write failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
