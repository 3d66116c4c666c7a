//! Property-based tests for frame encoding/decoding.
//!
//! Frames built from fields the encoder accepts must decode back to the same
//! frame, and decoding arbitrary text must never panic.

use proptest::prelude::*;
use tapewire_proto::{Frame, MAX_FRAME_LEN, ProtocolError};

/// Strategy for client ids and addresses: no separator, no line breaks.
fn header_field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._:-]{0,24}"
}

/// Strategy for payloads: anything but line breaks, `|` allowed.
fn payload_field() -> impl Strategy<Value = String> {
    "[^\r\n]{0,256}"
}

fn arbitrary_frame() -> impl Strategy<Value = Frame> {
    (header_field(), header_field(), payload_field())
        .prop_map(|(client_id, address, payload)| Frame::new(client_id, address, payload))
}

proptest! {
    #[test]
    fn prop_frame_decode_inverts_encode(frame in arbitrary_frame()) {
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("encode should succeed");

        // PROPERTY: exactly one line break, at the end
        prop_assert_eq!(wire.iter().filter(|&&b| b == b'\n').count(), 1);
        prop_assert_eq!(wire.last(), Some(&b'\n'));

        let line = String::from_utf8(wire).expect("frames are UTF-8");
        let decoded = Frame::decode(&line).expect("decode should succeed");

        // PROPERTY: round-trip is identity
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn prop_decode_never_panics(line in ".{0,512}") {
        match Frame::decode(&line) {
            Ok(frame) => {
                // PROPERTY: a decoded frame has no separator in its header fields
                prop_assert!(!frame.client_id.contains('|'));
                prop_assert!(!frame.address.contains('|'));
            },
            Err(ProtocolError::MalformedFrame { fields }) => prop_assert!(fields < 3),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_payload_separators_survive(prefix in "[a-z]{0,8}", suffix in "[a-z]{0,8}") {
        let payload = format!("{prefix}|{suffix}|");
        let frame = Frame::new("client", "host", payload.clone());

        let decoded = Frame::decode(&frame.to_line().expect("encode should succeed"))
            .expect("decode should succeed");

        prop_assert_eq!(decoded.payload, payload);
    }
}

#[test]
fn oversized_line_is_rejected_before_splitting() {
    let line = "x".repeat(MAX_FRAME_LEN + 1);
    assert_eq!(
        Frame::decode(&line),
        Err(ProtocolError::FrameTooLarge { size: MAX_FRAME_LEN + 1, max: MAX_FRAME_LEN })
    );
}
