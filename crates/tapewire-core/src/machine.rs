//! The tape machine interpreter.
//!
//! [`TapeMachine`] owns its tape and rule program and is advanced one
//! transition at a time with [`TapeMachine::step`]. It does no I/O and holds
//! no locks; callers that want to run it on a timer move it into a
//! [`crate::MachineRunner`].
//!
//! # Step semantics
//!
//! 1. Read the symbol under the head (blank if the head is past the end).
//! 2. Find the first rule for `(state, symbol)`. None: halt with
//!    [`HaltReason::NoMatchingRule`], tape and head untouched.
//! 3. Write, growing the tape by one blank cell if the head is past the end.
//! 4. Move left (floored at 0) or right, appending a blank cell when the head
//!    steps off the right end. Enter the new state.
//! 5. Halt with [`HaltReason::HaltingState`] if the new state is a halting
//!    state.
//!
//! The head is always on a cell after a rule is applied, so running off the
//! right edge is not a reason to stop.

use std::fmt;

use crate::{
    observer::MachineObserver,
    rule::{RuleSet, TransitionRule},
    symbol::{Direction, StateId, Symbol},
    tape::Tape,
};

/// Interpreter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// State after construction and after every reset
    pub initial_state: StateId,

    /// States that stop the machine once entered
    pub halting_states: Vec<StateId>,
}

impl MachineConfig {
    /// True if entering `state` halts the machine.
    #[must_use]
    pub fn is_halting(&self, state: StateId) -> bool {
        self.halting_states.contains(&state)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            initial_state: StateId::from_const(1),
            halting_states: vec![StateId::from_const(0), StateId::from_const(3), StateId::from_const(4)],
        }
    }
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No rule for the current state and symbol
    NoMatchingRule,
    /// Entered one of the configured halting states
    HaltingState(StateId),
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingRule => f.write_str("no matching rule"),
            Self::HaltingState(state) => write!(f, "halting state {state}"),
        }
    }
}

/// Result of a single [`TapeMachine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A rule was applied and the machine keeps running
    Continue(TransitionRule),

    /// The machine is halted
    Halted {
        /// Rule applied on this step, `None` if nothing changed
        applied: Option<TransitionRule>,
        /// Why the machine is halted
        reason: HaltReason,
    },
}

impl StepOutcome {
    /// True if the machine is halted after this step.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted { .. })
    }

    /// Rule applied on this step, if any.
    #[must_use]
    pub fn applied(&self) -> Option<TransitionRule> {
        match *self {
            Self::Continue(rule) => Some(rule),
            Self::Halted { applied, .. } => applied,
        }
    }
}

/// Point-in-time copy of the machine's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSnapshot {
    /// Tape contents
    pub tape: Tape,
    /// Head position, at most `tape.len()`
    pub head: usize,
    /// Current state
    pub state: StateId,
    /// Rules applied since construction or the last reset
    pub step_count: u64,
    /// Set once the machine has halted
    pub halted: Option<HaltReason>,
}

impl MachineSnapshot {
    /// Tape text with the head cell bracketed.
    #[must_use]
    pub fn render(&self) -> String {
        self.tape.render_with_head(self.head)
    }
}

impl fmt::Display for MachineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}, head {}, state {}: {}", self.step_count, self.head, self.state, self.render())?;
        if let Some(reason) = self.halted {
            write!(f, " (halted: {reason})")?;
        }
        Ok(())
    }
}

/// Finite-tape Turing machine.
///
/// # Invariants
///
/// - Head Bound: `head < tape.len()` once a rule has been applied.
///   `head == tape.len()` only happens on an empty tape that nothing has
///   written to yet.
///
/// - Monotonic Tape: the tape never shrinks. A step grows it by at most one
///   cell, or two when the first write to an empty tape moves right.
///
/// - Halt Is Sticky: once halted, `step` changes nothing until `reset`.
pub struct TapeMachine {
    tape: Tape,
    rules: RuleSet,
    head: usize,
    state: StateId,
    step_count: u64,
    halted: Option<HaltReason>,
    config: MachineConfig,
    observer: Option<Box<dyn MachineObserver>>,
}

impl TapeMachine {
    /// Machine with the default configuration, head at the middle of `tape`.
    #[must_use]
    pub fn new(tape: Tape, rules: RuleSet) -> Self {
        Self::with_config(tape, rules, MachineConfig::default())
    }

    /// Machine with an explicit configuration.
    #[must_use]
    pub fn with_config(tape: Tape, rules: RuleSet, config: MachineConfig) -> Self {
        let head = tape.len() / 2;
        Self {
            tape,
            rules,
            head,
            state: config.initial_state,
            step_count: 0,
            halted: None,
            config,
            observer: None,
        }
    }

    /// Install the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl MachineObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove and return the observer.
    pub fn take_observer(&mut self) -> Option<Box<dyn MachineObserver>> {
        self.observer.take()
    }

    /// Apply one transition.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(reason) = self.halted {
            return StepOutcome::Halted { applied: None, reason };
        }

        let read = self.tape.get(self.head);
        let Some(rule) = self.rules.find(self.state, read).copied() else {
            return self.halt(None, HaltReason::NoMatchingRule);
        };

        // Grows the tape only when head == len, i.e. on an empty tape
        self.tape.write(self.head, rule.write);
        self.head = match rule.direction {
            Direction::Left => self.head.saturating_sub(1),
            Direction::Right => self.head + 1,
        };
        if self.head == self.tape.len() {
            self.tape.write(self.head, Symbol::BLANK);
        }
        self.state = rule.next_state;
        self.step_count += 1;

        tracing::trace!(rule = %rule, head = self.head, state = %self.state, "applied rule");

        if self.config.is_halting(self.state) {
            return self.halt(Some(rule), HaltReason::HaltingState(self.state));
        }

        self.notify_update();
        StepOutcome::Continue(rule)
    }

    /// Step until halted or `max_steps` rules have been applied. Returns the
    /// number of rules applied.
    pub fn run(&mut self, max_steps: u64) -> u64 {
        let mut applied = 0;
        while applied < max_steps {
            let outcome = self.step();
            if outcome.applied().is_some() {
                applied += 1;
            }
            if outcome.is_halted() {
                break;
            }
        }
        applied
    }

    /// Replace tape and program and start over from the initial state.
    pub fn reset(&mut self, tape: Tape, rules: RuleSet) {
        self.head = tape.len() / 2;
        self.tape = tape;
        self.rules = rules;
        self.state = self.config.initial_state;
        self.step_count = 0;
        self.halted = None;

        tracing::debug!(len = self.tape.len(), rules = self.rules.len(), "machine reset");
        self.notify_update();
    }

    /// Tape text with the head cell bracketed, e.g. `01[1]0`.
    #[must_use]
    pub fn render_with_head(&self) -> String {
        self.tape.render_with_head(self.head)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Rules applied since construction or the last reset.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// True once the machine has halted.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Why the machine halted, if it has.
    #[must_use]
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    /// Head position.
    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Tape contents.
    #[must_use]
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Rule program.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Symbol at `pos`, blank outside the tape.
    #[must_use]
    pub fn symbol_at(&self, pos: usize) -> Symbol {
        self.tape.get(pos)
    }

    /// Copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state,
            step_count: self.step_count,
            halted: self.halted,
        }
    }

    fn halt(&mut self, applied: Option<TransitionRule>, reason: HaltReason) -> StepOutcome {
        self.halted = Some(reason);
        tracing::debug!(%reason, steps = self.step_count, "machine halted");

        if self.observer.is_some() {
            let snapshot = self.snapshot();
            if let Some(observer) = self.observer.as_mut() {
                observer.on_halt(&snapshot, reason);
            }
        }
        StepOutcome::Halted { applied, reason }
    }

    fn notify_update(&mut self) {
        if self.observer.is_some() {
            let snapshot = self.snapshot();
            if let Some(observer) = self.observer.as_mut() {
                observer.on_update(&snapshot);
            }
        }
    }
}

impl fmt::Debug for TapeMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapeMachine")
            .field("tape", &self.render_with_head())
            .field("rules", &self.rules.to_string())
            .field("state", &self.state)
            .field("step_count", &self.step_count)
            .field("halted", &self.halted)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
