//! Tapewire interpreter.
//!
//! A small finite-tape Turing machine over the binary alphabet. Rule
//! programs are plain text (see [`RuleSet`]), tapes are `0`/`1` strings, and
//! the machine reports every change through a [`MachineObserver`].
//!
//! # Components
//!
//! - [`TapeMachine`]: the interpreter, advanced with [`TapeMachine::step`]
//! - [`RuleSet`] / [`TransitionRule`]: rule programs and their text form
//! - [`Tape`]: self-extending binary tape
//! - [`MachineRunner`]: steps a machine on a timer task
//! - [`ChannelObserver`]: forwards observer calls as [`MachineEvent`]s

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod machine;
mod observer;
mod rule;
mod runner;
mod symbol;
mod tape;

pub use error::{RuleError, RuleErrorReason, RunnerError, TapeError};
pub use machine::{HaltReason, MachineConfig, MachineSnapshot, StepOutcome, TapeMachine};
pub use observer::{ChannelObserver, MachineEvent, MachineObserver};
pub use rule::{RULE_TOKEN_LEN, RuleSet, TransitionRule};
pub use runner::{MachineRunner, RunnerConfig, RunnerHandle};
pub use symbol::{Direction, StateId, Symbol};
pub use tape::Tape;
