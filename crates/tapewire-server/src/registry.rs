//! Session registry and the shared message slot.
//!
//! The registry maps client ids to their live sessions and holds the one
//! piece of state all clients share: the last stored message. Every
//! non-command payload from any client overwrites the slot and every
//! `REQUEST_DATA` from any client reads it. It is a blackboard, not a
//! mailbox; nothing is addressed to a particular client.
//!
//! The registry is plain data with no I/O. The server wraps it in a single
//! mutex together with the per-session outbound channels.

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
};

use crate::error::SessionError;

/// Information about a registered session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Server-assigned id, unique for the server's lifetime
    pub session_id: u64,
    /// Peer address of the socket
    pub remote_address: SocketAddr,
    /// Address the client reported in its handshake frame
    pub reported_address: String,
}

/// One payload a client stored, as kept in the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Client that sent it
    pub client_id: String,
    /// Payload as received
    pub payload: String,
}

/// Registry for tracking sessions and the shared slot.
///
/// # Invariants
///
/// - Unique Client: at most one session per client id.
///
/// - Bounded Log: the message log never holds more than its capacity; the
///   oldest record is evicted first.
#[derive(Debug)]
pub struct SessionRegistry {
    /// Client id → live session
    sessions: HashMap<String, SessionInfo>,
    /// Shared slot; `None` until something non-empty is stored
    last_message: Option<String>,
    /// Most recent stored payloads, oldest first
    message_log: VecDeque<MessageRecord>,
    log_capacity: usize,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(max_sessions: usize, log_capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            last_message: None,
            message_log: VecDeque::with_capacity(log_capacity.min(1024)),
            log_capacity,
            max_sessions,
        }
    }

    /// Register a session under `client_id`.
    ///
    /// # Errors
    ///
    /// - `SessionError::ClientIdTaken` if the id already has a live session
    /// - `SessionError::ServerFull` if the session limit is reached
    pub fn register(&mut self, client_id: &str, info: SessionInfo) -> Result<(), SessionError> {
        if self.sessions.contains_key(client_id) {
            return Err(SessionError::ClientIdTaken(client_id.to_string()));
        }
        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::ServerFull(self.max_sessions));
        }

        self.sessions.insert(client_id.to_string(), info);
        Ok(())
    }

    /// Remove the session for `client_id` if it is still `session_id`.
    ///
    /// The id check keeps a session that is shutting down from removing a
    /// newer session that re-registered the same client id.
    pub fn unregister(&mut self, client_id: &str, session_id: u64) -> Option<SessionInfo> {
        match self.sessions.get(client_id) {
            Some(info) if info.session_id == session_id => self.sessions.remove(client_id),
            _ => None,
        }
    }

    /// Drop every session. Used when the server stops.
    pub fn clear_sessions(&mut self) -> Vec<String> {
        self.sessions.drain().map(|(client_id, _)| client_id).collect()
    }

    /// Overwrite the shared slot and append to the message log.
    ///
    /// An empty payload empties the slot.
    pub fn store(&mut self, client_id: &str, payload: &str) {
        self.last_message = if payload.is_empty() { None } else { Some(payload.to_string()) };

        if self.log_capacity == 0 {
            return;
        }
        if self.message_log.len() == self.log_capacity {
            self.message_log.pop_front();
        }
        self.message_log
            .push_back(MessageRecord { client_id: client_id.to_string(), payload: payload.to_string() });
    }

    /// Current contents of the shared slot.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Stored payloads, oldest first.
    pub fn message_log(&self) -> impl Iterator<Item = &MessageRecord> {
        self.message_log.iter()
    }

    /// Session metadata. `None` if the client is not connected.
    pub fn session(&self, client_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(client_id)
    }

    /// Connected client ids, sorted.
    pub fn client_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(session_id: u64) -> SessionInfo {
        SessionInfo {
            session_id,
            remote_address: SocketAddr::from(([127, 0, 0, 1], 40000 + session_id as u16)),
            reported_address: "localhost".to_string(),
        }
    }

    #[test]
    fn register_and_lookup_session() {
        let mut registry = SessionRegistry::new(8, 16);

        registry.register("alice", info(1)).unwrap();
        assert_eq!(registry.session("alice").map(|s| s.session_id), Some(1));
        assert!(registry.session("bob").is_none());
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn duplicate_client_id_is_rejected() {
        let mut registry = SessionRegistry::new(8, 16);

        registry.register("alice", info(1)).unwrap();
        let err = registry.register("alice", info(2)).unwrap_err();
        assert!(matches!(err, SessionError::ClientIdTaken(id) if id == "alice"));
        assert_eq!(registry.session("alice").map(|s| s.session_id), Some(1));
    }

    #[test]
    fn session_limit_is_enforced() {
        let mut registry = SessionRegistry::new(2, 16);

        registry.register("a", info(1)).unwrap();
        registry.register("b", info(2)).unwrap();
        assert!(matches!(registry.register("c", info(3)), Err(SessionError::ServerFull(2))));

        registry.unregister("a", 1);
        registry.register("c", info(3)).unwrap();
    }

    #[test]
    fn unregister_ignores_stale_session_id() {
        let mut registry = SessionRegistry::new(8, 16);

        registry.register("alice", info(1)).unwrap();
        assert!(registry.unregister("alice", 7).is_none());
        assert!(registry.session("alice").is_some());

        assert_eq!(registry.unregister("alice", 1).map(|s| s.session_id), Some(1));
        assert!(registry.session("alice").is_none());
    }

    #[test]
    fn shared_slot_is_last_write_wins() {
        let mut registry = SessionRegistry::new(8, 16);
        assert_eq!(registry.last_message(), None);

        registry.store("a", "first");
        registry.store("b", "second");
        assert_eq!(registry.last_message(), Some("second"));

        registry.store("a", "");
        assert_eq!(registry.last_message(), None);
    }

    #[test]
    fn message_log_evicts_oldest() {
        let mut registry = SessionRegistry::new(8, 2);

        registry.store("a", "1");
        registry.store("b", "2");
        registry.store("c", "3");

        let log: Vec<_> = registry.message_log().map(|r| r.payload.as_str()).collect();
        assert_eq!(log, ["2", "3"]);
        assert_eq!(registry.message_log().next().map(|r| r.client_id.as_str()), Some("b"));
    }

    #[test]
    fn zero_capacity_log_still_updates_slot() {
        let mut registry = SessionRegistry::new(8, 0);

        registry.store("a", "x");
        assert_eq!(registry.message_log().count(), 0);
        assert_eq!(registry.last_message(), Some("x"));
    }

    #[test]
    fn clear_sessions_keeps_slot() {
        let mut registry = SessionRegistry::new(8, 16);
        registry.register("b", info(2)).unwrap();
        registry.register("a", info(1)).unwrap();
        registry.store("a", "kept");

        assert_eq!(registry.client_ids(), ["a", "b"]);
        let mut cleared = registry.clear_sessions();
        cleared.sort();
        assert_eq!(cleared, ["a", "b"]);
        assert_eq!(registry.session_count(), 0);
        assert_eq!(registry.last_message(), Some("kept"));
    }
}
