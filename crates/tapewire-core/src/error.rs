//! Interpreter error types.
//!
//! Halting is never an error: a machine that runs out of rules reports
//! [`crate::HaltReason::NoMatchingRule`] instead.

use std::fmt;

use thiserror::Error;

/// Why a single rule token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleErrorReason {
    /// Token is not exactly five characters
    Length,
    /// Current or next state is not a digit 0-9
    InvalidState,
    /// Read or write symbol is not `0`/`1`
    InvalidSymbol,
    /// Direction is not `0` (left) or `1` (right)
    InvalidDirection,
}

impl fmt::Display for RuleErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Length => "expected exactly 5 characters",
            Self::InvalidState => "state must be a digit 0-9",
            Self::InvalidSymbol => "symbol must be 0 or 1",
            Self::InvalidDirection => "direction must be 0 (left) or 1 (right)",
        };
        f.write_str(text)
    }
}

/// Rule program parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// One whitespace-separated token is not a valid rule
    #[error("malformed rule {token:?}: {reason}")]
    MalformedRule {
        /// Offending token as written
        token: String,
        /// What is wrong with it
        reason: RuleErrorReason,
    },

    /// Program text contains no rules at all
    #[error("rule program is empty")]
    Empty,
}

/// Tape parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TapeError {
    /// Tape text contains something other than `0`/`1`
    #[error("invalid tape symbol {found:?} at position {position}")]
    InvalidSymbol {
        /// Character that was rejected
        found: char,
        /// Character index in the input
        position: usize,
    },
}

/// Continuous-run failures.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runner task panicked or was cancelled before returning the machine
    #[error("runner task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
