//! Reserved payload literals and their classification.
//!
//! Client-to-server payloads travel inside a [`crate::Frame`]; the server
//! answers with bare text lines. Both directions share the literals below.

/// Payload asking the server for the shared slot's current value.
pub const REQUEST_DATA: &str = "REQUEST_DATA";

/// Server notice that it is stopping. No reply expected.
pub const SERVER_SHUTDOWN: &str = "SERVER_SHUTDOWN";

/// Acknowledgement that a payload replaced the shared slot.
pub const MESSAGE_STORED: &str = "MESSAGE_STORED";

/// Answer to [`REQUEST_DATA`] while the shared slot is empty.
pub const NO_VALUE_REGISTERED: &str = "NO_VALUE_REGISTERED";

/// Payload of the handshake frame.
pub const HELLO: &str = "hello";

/// Greeting sent by the server once a session is registered.
pub const WELCOME: &str = "WELCOME";

/// Handshake rejected: another session already uses this client id.
pub const CLIENT_ID_TAKEN: &str = "CLIENT_ID_TAKEN";

/// Handshake rejected: the server is at its session limit.
pub const SERVER_FULL: &str = "SERVER_FULL";

/// A line from the client could not be decoded as a frame.
pub const MALFORMED_FRAME: &str = "MALFORMED_FRAME";

/// What a client-to-server payload asks the server to do.
///
/// Only [`REQUEST_DATA`] is a command; every other payload, including text
/// that happens to equal another reserved literal, is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Read the shared slot
    RequestData,
    /// Overwrite the shared slot with this text
    Store(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a frame payload.
    #[must_use]
    pub fn parse(payload: &'a str) -> Self {
        if payload == REQUEST_DATA { Self::RequestData } else { Self::Store(payload) }
    }
}

/// A line received from the server, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage<'a> {
    /// Session registered
    Welcome,
    /// Server is shutting down
    Shutdown,
    /// Payload was cached
    MessageStored,
    /// Shared slot is empty
    NoValueRegistered,
    /// Handshake refused: duplicate client id
    ClientIdTaken,
    /// Handshake refused: session limit reached
    ServerFull,
    /// Previous line was not a valid frame
    MalformedFrame,
    /// Contents of the shared slot
    Data(&'a str),
}

impl<'a> ServerMessage<'a> {
    /// Classify one line (without its line break).
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        match line {
            WELCOME => Self::Welcome,
            SERVER_SHUTDOWN => Self::Shutdown,
            MESSAGE_STORED => Self::MessageStored,
            NO_VALUE_REGISTERED => Self::NoValueRegistered,
            CLIENT_ID_TAKEN => Self::ClientIdTaken,
            SERVER_FULL => Self::ServerFull,
            MALFORMED_FRAME => Self::MalformedFrame,
            other => Self::Data(other),
        }
    }

    /// True if this line ends the session from the server side.
    ///
    /// Handshake refusals only arrive before [`WELCOME`]. Once the session is
    /// welcomed the same text can only be a stored payload read back with
    /// [`REQUEST_DATA`], so only [`SERVER_SHUTDOWN`] still ends it.
    #[must_use]
    pub fn ends_session(&self, welcomed: bool) -> bool {
        match self {
            Self::Shutdown => true,
            Self::ClientIdTaken | Self::ServerFull => !welcomed,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_request_data_is_a_command() {
        assert_eq!(Command::parse("REQUEST_DATA"), Command::RequestData);
        assert_eq!(Command::parse("request_data"), Command::Store("request_data"));
        assert_eq!(Command::parse(SERVER_SHUTDOWN), Command::Store(SERVER_SHUTDOWN));
        assert_eq!(Command::parse(""), Command::Store(""));
    }

    #[test]
    fn server_lines_are_classified() {
        assert_eq!(ServerMessage::parse("WELCOME"), ServerMessage::Welcome);
        assert_eq!(ServerMessage::parse("MESSAGE_STORED"), ServerMessage::MessageStored);
        assert_eq!(ServerMessage::parse("NO_VALUE_REGISTERED"), ServerMessage::NoValueRegistered);
        assert_eq!(ServerMessage::parse("10110 21101"), ServerMessage::Data("10110 21101"));
    }

    #[test]
    fn refusals_end_the_session_only_before_welcome() {
        assert!(ServerMessage::ClientIdTaken.ends_session(false));
        assert!(ServerMessage::ServerFull.ends_session(false));
        assert!(!ServerMessage::ClientIdTaken.ends_session(true));
        assert!(!ServerMessage::ServerFull.ends_session(true));
    }

    #[test]
    fn shutdown_always_ends_the_session() {
        assert!(ServerMessage::Shutdown.ends_session(false));
        assert!(ServerMessage::Shutdown.ends_session(true));
        assert!(!ServerMessage::Welcome.ends_session(false));
        assert!(!ServerMessage::MessageStored.ends_session(true));
        assert!(!ServerMessage::Data("x").ends_session(true));
    }
}
