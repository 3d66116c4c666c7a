//! Fuzz target for rule program parsing
//!
//! # Invariants
//!
//! - Never panics on any UTF-8 input
//! - A parsed program prints to text that parses back to the same program

#![no_main]

use libfuzzer_sys::fuzz_target;
use tapewire_core::{RuleSet, Tape};

fuzz_target!(|text: &str| {
    let _ = text.parse::<Tape>();

    if let Ok(rules) = RuleSet::from_text(text) {
        let printed = rules.to_string();
        let reparsed = RuleSet::from_text(&printed).expect("printed program must parse");
        assert_eq!(reparsed, rules);
    }
});
