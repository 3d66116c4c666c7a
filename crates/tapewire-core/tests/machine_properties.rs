//! Property-based tests for the tape machine
//!
//! Generates arbitrary rule programs and tapes and checks the invariants that
//! must hold for every step, not just the hand-picked examples in the unit
//! tests.

use proptest::prelude::*;
use tapewire_core::{
    Direction, HaltReason, RuleSet, StateId, StepOutcome, Symbol, Tape, TapeMachine, TransitionRule,
};

fn arbitrary_symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![Just(Symbol::Zero), Just(Symbol::One)]
}

fn arbitrary_state() -> impl Strategy<Value = StateId> {
    (0..=StateId::MAX).prop_filter_map("state in range", StateId::new)
}

fn arbitrary_rule() -> impl Strategy<Value = TransitionRule> {
    (
        arbitrary_state(),
        arbitrary_symbol(),
        arbitrary_symbol(),
        prop_oneof![Just(Direction::Left), Just(Direction::Right)],
        arbitrary_state(),
    )
        .prop_map(|(state, read, write, direction, next)| {
            TransitionRule::new(state, read, write, direction, next)
        })
}

fn arbitrary_rules() -> impl Strategy<Value = RuleSet> {
    prop::collection::vec(arbitrary_rule(), 1..20).prop_map(RuleSet::from_iter)
}

fn arbitrary_tape() -> impl Strategy<Value = Tape> {
    prop::collection::vec(arbitrary_symbol(), 0..32).prop_map(Tape::from)
}

proptest! {
    #[test]
    fn prop_rule_program_text_round_trip(rules in arbitrary_rules()) {
        let text = rules.to_string();
        let parsed: RuleSet = text.parse().expect("display output must parse");
        prop_assert_eq!(parsed, rules);
    }

    #[test]
    fn prop_rule_parse_never_panics(text in "\\PC{0,64}") {
        let _ = text.parse::<RuleSet>();
    }

    #[test]
    fn prop_tape_parse_never_panics(text in "\\PC{0,64}") {
        let _ = text.parse::<Tape>();
    }

    #[test]
    fn prop_no_matching_rule_changes_nothing(tape in arbitrary_tape(), rules in arbitrary_rules()) {
        let mut machine = TapeMachine::new(tape, rules);
        let read = machine.symbol_at(machine.head());
        prop_assume!(machine.rules().find(machine.state(), read).is_none());

        let before = machine.snapshot();
        let outcome = machine.step();

        prop_assert_eq!(outcome, StepOutcome::Halted { applied: None, reason: HaltReason::NoMatchingRule });
        prop_assert_eq!(machine.tape(), &before.tape);
        prop_assert_eq!(machine.head(), before.head);
        prop_assert_eq!(machine.state(), before.state);
        prop_assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn prop_head_stays_within_tape(tape in arbitrary_tape(), rules in arbitrary_rules()) {
        let mut machine = TapeMachine::new(tape, rules);

        for _ in 0..200 {
            let len_before = machine.tape().len();
            let outcome = machine.step();

            prop_assert!(machine.head() <= machine.tape().len());
            if machine.step_count() > 0 {
                prop_assert!(machine.head() < machine.tape().len());
            }
            prop_assert!(machine.tape().len() >= len_before);
            prop_assert!(machine.tape().len() <= len_before.max(1) + 1);

            if outcome.is_halted() {
                break;
            }
        }
    }

    #[test]
    fn prop_write_past_edge_grows_by_one(write in arbitrary_symbol()) {
        // Empty tape puts the head at the right edge
        let rule = TransitionRule::new(
            StateId::new(1).unwrap(),
            Symbol::BLANK,
            write,
            Direction::Left,
            StateId::new(2).unwrap(),
        );
        let mut machine = TapeMachine::new(Tape::new(), std::iter::once(rule).collect());
        machine.step();

        prop_assert_eq!(machine.tape().len(), 1);
        prop_assert_eq!(machine.symbol_at(0), write);
    }

    #[test]
    fn prop_right_move_off_edge_appends_blank(
        cells in prop::collection::vec(arbitrary_symbol(), 1..32),
        write in arbitrary_symbol(),
    ) {
        let len = cells.len();
        // Head starts at len / 2 and walks right whatever it reads
        let walk = [Symbol::Zero, Symbol::One].map(|read| {
            TransitionRule::new(StateId::new(1).unwrap(), read, write, Direction::Right, StateId::new(1).unwrap())
        });
        let mut machine = TapeMachine::new(Tape::from(cells), walk.into_iter().collect());

        let moves = len - len / 2;
        for _ in 0..moves {
            prop_assert!(!machine.step().is_halted());
        }

        prop_assert_eq!(machine.head(), len);
        prop_assert_eq!(machine.tape().len(), len + 1);
        prop_assert_eq!(machine.symbol_at(len), Symbol::BLANK);
        prop_assert!(!machine.is_halted());
    }

    #[test]
    fn prop_halted_machine_is_frozen(tape in arbitrary_tape(), rules in arbitrary_rules()) {
        let mut machine = TapeMachine::new(tape, rules);
        machine.run(500);
        prop_assume!(machine.is_halted());

        let frozen = machine.snapshot();
        for _ in 0..5 {
            prop_assert!(machine.step().applied().is_none());
        }
        prop_assert_eq!(machine.snapshot(), frozen);
    }
}
