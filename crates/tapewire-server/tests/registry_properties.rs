//! Property-based tests for the session registry
//!
//! Applies random sequences of register/unregister/store operations and
//! checks the registry against a simple model after every step.

use std::{collections::HashMap, net::SocketAddr};

use proptest::prelude::*;
use tapewire_server::{SessionInfo, SessionRegistry};

#[derive(Debug, Clone)]
enum Op {
    Register { client: u8 },
    Unregister { client: u8 },
    Store { client: u8, payload: String },
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(|client| Op::Register { client }),
        (0u8..6).prop_map(|client| Op::Unregister { client }),
        (0u8..6, "[a-z|]{0,6}").prop_map(|(client, payload)| Op::Store { client, payload }),
    ]
}

fn info(session_id: u64) -> SessionInfo {
    SessionInfo {
        session_id,
        remote_address: SocketAddr::from(([127, 0, 0, 1], 9000)),
        reported_address: "localhost".to_string(),
    }
}

proptest! {
    #[test]
    fn prop_registry_matches_model(
        ops in prop::collection::vec(arbitrary_op(), 0..64),
        max_sessions in 1usize..5,
        capacity in 0usize..6,
    ) {
        let mut registry = SessionRegistry::new(max_sessions, capacity);
        let mut live: HashMap<String, u64> = HashMap::new();
        let mut slot: Option<String> = None;
        let mut stored = 0usize;
        let mut next_id = 1u64;

        for op in ops {
            match op {
                Op::Register { client } => {
                    let id = format!("c{client}");
                    let accepted = registry.register(&id, info(next_id)).is_ok();
                    let expected = !live.contains_key(&id) && live.len() < max_sessions;
                    prop_assert_eq!(accepted, expected);
                    if accepted {
                        live.insert(id, next_id);
                    }
                    next_id += 1;
                },
                Op::Unregister { client } => {
                    let id = format!("c{client}");
                    let session_id = live.get(&id).copied().unwrap_or(0);
                    let removed = registry.unregister(&id, session_id).is_some();
                    prop_assert_eq!(removed, live.remove(&id).is_some());
                },
                Op::Store { client, payload } => {
                    registry.store(&format!("c{client}"), &payload);
                    slot = if payload.is_empty() { None } else { Some(payload) };
                    stored += 1;
                },
            }

            prop_assert!(registry.session_count() <= max_sessions);
            prop_assert_eq!(registry.session_count(), live.len());
            prop_assert_eq!(registry.last_message(), slot.as_deref());
            prop_assert_eq!(registry.message_log().count(), stored.min(capacity));
        }
    }
}
