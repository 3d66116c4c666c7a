//! Notifications emitted by a running server.

use std::net::SocketAddr;

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerState {
    /// Accepting connections
    Listening,
    /// Listener closed and every session gone
    Stopped,
}

/// Events the server reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client completed the handshake
    ClientConnected {
        /// Id the client registered with
        client_id: String,
        /// Peer address of its socket
        address: SocketAddr,
    },

    /// A registered client's session ended
    ClientDisconnected {
        /// Id of the departed client
        client_id: String,
    },

    /// A client overwrote the shared slot
    MessageStored {
        /// Client that stored it
        client_id: String,
        /// Stored payload
        payload: String,
    },

    /// Server changed lifecycle state
    StateChanged(ServerState),
}
