//! Server configuration.

use std::time::Duration;

use tapewire_proto::MAX_FRAME_LEN;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 12345;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "127.0.0.1:12345"). Port 0 picks a free port.
    pub bind_address: String,
    /// How long a new connection may take to send its handshake line
    pub handshake_timeout: Duration,
    /// How long `stop` waits for sessions to close before aborting them
    pub shutdown_grace: Duration,
    /// Maximum concurrent registered sessions
    pub max_sessions: usize,
    /// Number of stored payloads kept in the message log
    pub message_log_capacity: usize,
    /// Longest accepted line, terminator included
    pub max_line_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("127.0.0.1:{DEFAULT_PORT}"),
            handshake_timeout: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(2),
            max_sessions: 64,
            message_log_capacity: 256,
            max_line_len: MAX_FRAME_LEN,
        }
    }
}
