//! Fuzz target for line splitting and Frame::decode
//!
//! Feeds arbitrary bytes through a `LineBuffer` and decodes every line.
//!
//! # Invariants
//!
//! - Never panics; invalid input is an `Err`
//! - A decoded frame that re-encodes decodes to the same frame

#![no_main]

use bytes::BufMut;
use libfuzzer_sys::fuzz_target;
use tapewire_proto::{Frame, LineBuffer};

fuzz_target!(|data: &[u8]| {
    let mut lines = LineBuffer::new(1024);
    lines.buffer_mut().put_slice(data);

    let mut decoded = Vec::new();
    while let Ok(Some(line)) = lines.next_line() {
        decoded.push(line);
    }
    decoded.extend(lines.take_remainder());

    for line in decoded {
        let Ok(frame) = Frame::decode(&line) else {
            continue;
        };
        if let Ok(encoded) = frame.to_line() {
            let again = Frame::decode(&encoded).expect("encoded frame must decode");
            assert_eq!(again, frame);
        }
    }
});
