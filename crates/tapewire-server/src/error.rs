//! Server error types.
//!
//! [`ServerError`] covers failures of the server as a whole and is only
//! returned from startup. [`SessionError`] covers a single connection; it is
//! logged where it happens and never reaches other sessions.

use std::io;

use tapewire_proto::ProtocolError;
use thiserror::Error;

/// Errors that prevent the server from running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound.
    ///
    /// Usually the address is in use or not local. Fatal for startup.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// Configuration error (unparseable bind address, zero session limit).
    ///
    /// Fix the configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Socket error on a bound listener, e.g. reading its local address.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// Errors that end one client session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No handshake line arrived in time
    #[error("handshake timed out")]
    HandshakeTimeout,

    /// Handshake named a client id that already has a live session
    #[error("client id {0:?} is already connected")]
    ClientIdTaken(String),

    /// Session limit reached
    #[error("server full ({0} sessions)")]
    ServerFull(usize),

    /// Peer closed the connection before the handshake, or the server is
    /// shutting down
    #[error("connection closed")]
    Closed,

    /// Handshake line was not a valid frame, or a line was too long
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Socket read or write failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display() {
        let err = ServerError::Bind {
            address: "127.0.0.1:1".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:1: in use");

        let err = ServerError::Config("max_sessions must be at least 1".to_string());
        assert_eq!(err.to_string(), "configuration error: max_sessions must be at least 1");
    }

    #[test]
    fn transport_error_keeps_io_source() {
        let err: ServerError = io::Error::new(io::ErrorKind::NotConnected, "socket gone").into();
        assert_eq!(err.to_string(), "transport error: socket gone");

        let source = std::error::Error::source(&err).and_then(|e| e.downcast_ref::<io::Error>());
        assert_eq!(source.map(io::Error::kind), Some(io::ErrorKind::NotConnected));
    }

    #[test]
    fn session_error_display() {
        assert_eq!(
            SessionError::ClientIdTaken("alice".to_string()).to_string(),
            "client id \"alice\" is already connected"
        );
        assert_eq!(SessionError::ServerFull(4).to_string(), "server full (4 sessions)");
        let err: SessionError = ProtocolError::MalformedFrame { fields: 1 }.into();
        assert_eq!(err.to_string(), "protocol error: malformed frame: expected 3 fields, found 1");
    }
}
