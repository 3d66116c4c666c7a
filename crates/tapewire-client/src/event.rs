//! Connection states and the events a client engine emits.

use std::fmt;

use tapewire_core::RuleSet;

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection
    Disconnected,
    /// TCP connect in progress
    Connecting,
    /// Handshake sent; frames may be sent
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(text)
    }
}

/// Events delivered to the engine's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Connection state changed
    StatusChanged {
        /// New state
        state: ConnectionState,
        /// Human-readable cause ("connected", "server shut down", ...)
        detail: String,
    },

    /// One line arrived from the server, without its terminator
    MessageReceived(String),

    /// A line from the server parsed as a rule program
    RulesReceived(RuleSet),
}
