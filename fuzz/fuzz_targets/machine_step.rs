//! Fuzz target for TapeMachine stepping
//!
//! Builds a machine from arbitrary rules and tape and steps it.
//!
//! # Invariants
//!
//! - Head never moves past `tape.len()`, and sits on a cell once a rule ran
//! - A step never shrinks the tape and grows it by at most one cell, two for
//!   the first write to an empty tape
//! - Once halted, further steps change nothing

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tapewire_core::{Direction, RuleSet, StateId, Symbol, Tape, TapeMachine, TransitionRule};

#[derive(Debug, Arbitrary)]
struct FuzzRule {
    state: u8,
    read: bool,
    write: bool,
    right: bool,
    next_state: u8,
}

#[derive(Debug, Arbitrary)]
struct Scenario {
    rules: Vec<FuzzRule>,
    tape: Vec<bool>,
    steps: u8,
}

fn symbol(bit: bool) -> Symbol {
    if bit { Symbol::One } else { Symbol::Zero }
}

fn state(value: u8) -> Option<StateId> {
    StateId::new(value % (StateId::MAX + 1))
}

fuzz_target!(|scenario: Scenario| {
    let rules: RuleSet = scenario
        .rules
        .iter()
        .filter_map(|r| {
            Some(TransitionRule::new(
                state(r.state)?,
                symbol(r.read),
                symbol(r.write),
                if r.right { Direction::Right } else { Direction::Left },
                state(r.next_state)?,
            ))
        })
        .collect();
    let tape = Tape::from(scenario.tape.iter().copied().map(symbol).collect::<Vec<_>>());
    let mut machine = TapeMachine::new(tape, rules);

    for _ in 0..scenario.steps {
        let len = machine.tape().len();
        let halted_before = machine.snapshot();
        let was_halted = machine.is_halted();

        machine.step();

        assert!(machine.head() <= machine.tape().len());
        if machine.step_count() > 0 {
            assert!(machine.head() < machine.tape().len());
        }
        assert!(machine.tape().len() >= len && machine.tape().len() <= len.max(1) + 1);
        if was_halted {
            assert_eq!(machine.snapshot(), halted_before);
        }
    }
});
