//! Client configuration.

use std::time::Duration;

use tapewire_proto::MAX_FRAME_LEN;

/// Host used when none is given.
pub const DEFAULT_HOST: &str = "localhost";

/// Server port used when none is given.
pub const DEFAULT_PORT: u16 = 12345;

/// Client engine configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on TCP connection establishment
    pub connect_timeout: Duration,
    /// Longest accepted server line, terminator included
    pub max_line_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(5), max_line_len: MAX_FRAME_LEN }
    }
}
