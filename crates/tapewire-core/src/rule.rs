//! Transition rules and ordered rule programs.
//!
//! A rule is written as five characters, in this order:
//!
//! ```text
//! <state><read><new state><write><direction>
//! ```
//!
//! so `10110` means "in state 1 reading 0, go to state 1, write 1, move left".
//! A program is any number of such tokens separated by whitespace.

use std::{fmt, str::FromStr};

use crate::{
    error::{RuleError, RuleErrorReason},
    symbol::{Direction, StateId, Symbol},
};

/// Length of one encoded rule.
pub const RULE_TOKEN_LEN: usize = 5;

/// One transition: what to do in `state` when the head reads `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionRule {
    /// State the rule applies in
    pub state: StateId,
    /// Symbol under the head the rule applies to
    pub read: Symbol,
    /// Symbol written before moving
    pub write: Symbol,
    /// Head movement after the write
    pub direction: Direction,
    /// State entered after the move
    pub next_state: StateId,
}

impl TransitionRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(
        state: StateId,
        read: Symbol,
        write: Symbol,
        direction: Direction,
        next_state: StateId,
    ) -> Self {
        Self { state, read, write, direction, next_state }
    }

    /// True if this rule applies in `state` reading `symbol`.
    #[must_use]
    pub fn matches(&self, state: StateId, symbol: Symbol) -> bool {
        self.state == state && self.read == symbol
    }
}

impl FromStr for TransitionRule {
    type Err = RuleError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| RuleError::MalformedRule { token: token.to_string(), reason };

        let chars: Vec<char> = token.chars().collect();
        let Ok([state, read, next_state, write, direction]) =
            <[char; RULE_TOKEN_LEN]>::try_from(chars)
        else {
            return Err(malformed(RuleErrorReason::Length));
        };

        let state = StateId::from_digit(state).ok_or_else(|| malformed(RuleErrorReason::InvalidState))?;
        let next_state =
            StateId::from_digit(next_state).ok_or_else(|| malformed(RuleErrorReason::InvalidState))?;
        let read = Symbol::from_char(read).ok_or_else(|| malformed(RuleErrorReason::InvalidSymbol))?;
        let write = Symbol::from_char(write).ok_or_else(|| malformed(RuleErrorReason::InvalidSymbol))?;
        let direction =
            Direction::from_char(direction).ok_or_else(|| malformed(RuleErrorReason::InvalidDirection))?;

        Ok(Self { state, read, write, direction, next_state })
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.state.as_char(),
            self.read.as_char(),
            self.next_state.as_char(),
            self.write.as_char(),
            self.direction.as_char()
        )
    }
}

/// Ordered rule program.
///
/// Lookup returns the first rule in insertion order whose `(state, read)`
/// matches, so a later rule with the same key is shadowed and never fires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<TransitionRule>,
}

impl RuleSet {
    /// Empty program. A machine running it halts on its first step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse whitespace-separated rule tokens.
    ///
    /// # Errors
    ///
    /// - `RuleError::MalformedRule` for the first token that does not parse
    /// - `RuleError::Empty` if `text` holds no tokens
    pub fn from_text(text: &str) -> Result<Self, RuleError> {
        let rules = text
            .split_whitespace()
            .map(TransitionRule::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(Self { rules })
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, rule: TransitionRule) {
        self.rules.push(rule);
    }

    /// First rule matching `state` and `symbol`.
    #[must_use]
    pub fn find(&self, state: StateId, symbol: Symbol) -> Option<&TransitionRule> {
        self.rules.iter().find(|rule| rule.matches(state, symbol))
    }

    /// Rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRule> {
        self.rules.iter()
    }

    /// Number of rules, shadowed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the program has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_text(text)
    }
}

impl FromIterator<TransitionRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = TransitionRule>>(iter: I) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(value: u8) -> StateId {
        StateId::from_const(value)
    }

    #[test]
    fn token_field_order() {
        let rule: TransitionRule = "21101".parse().unwrap();
        assert_eq!(rule.state, state(2));
        assert_eq!(rule.read, Symbol::One);
        assert_eq!(rule.next_state, state(1));
        assert_eq!(rule.write, Symbol::Zero);
        assert_eq!(rule.direction, Direction::Right);
        assert_eq!(rule.to_string(), "21101");
    }

    #[test]
    fn rejects_each_bad_field() {
        let reason = |token: &str| match token.parse::<TransitionRule>() {
            Err(RuleError::MalformedRule { reason, .. }) => Some(reason),
            _ => None,
        };

        assert_eq!(reason("1011"), Some(RuleErrorReason::Length));
        assert_eq!(reason("101100"), Some(RuleErrorReason::Length));
        assert_eq!(reason("a0110"), Some(RuleErrorReason::InvalidState));
        assert_eq!(reason("10x10"), Some(RuleErrorReason::InvalidState));
        assert_eq!(reason("12110"), Some(RuleErrorReason::InvalidSymbol));
        assert_eq!(reason("10120"), Some(RuleErrorReason::InvalidSymbol));
        assert_eq!(reason("10112"), Some(RuleErrorReason::InvalidDirection));
    }

    #[test]
    fn tokens_are_measured_in_chars() {
        let err = "1011é".parse::<TransitionRule>().unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { reason: RuleErrorReason::InvalidDirection, .. }));

        let err = "10é".parse::<TransitionRule>().unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { reason: RuleErrorReason::Length, .. }));
    }

    #[test]
    fn program_parses_any_whitespace() {
        let rules = RuleSet::from_text("  10110\n21101\t30000 ").unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.to_string(), "10110 21101 30000");
    }

    #[test]
    fn rules_need_whitespace_between_them() {
        let err = RuleSet::from_text("1011021101").unwrap_err();
        assert_eq!(
            err,
            RuleError::MalformedRule { token: "1011021101".to_string(), reason: RuleErrorReason::Length }
        );
        assert_eq!(RuleSet::from_text("10110 21101").unwrap().len(), 2);
    }

    #[test]
    fn empty_program_is_rejected() {
        assert_eq!(RuleSet::from_text(""), Err(RuleError::Empty));
        assert_eq!(RuleSet::from_text(" \n\t"), Err(RuleError::Empty));
    }

    #[test]
    fn first_bad_token_is_reported() {
        let err = RuleSet::from_text("10110 2x101 999").unwrap_err();
        assert_eq!(
            err,
            RuleError::MalformedRule { token: "2x101".to_string(), reason: RuleErrorReason::InvalidSymbol }
        );
    }

    #[test]
    fn first_match_wins() {
        let rules = RuleSet::from_text("10210 10311").unwrap();
        let found = rules.find(state(1), Symbol::Zero).unwrap();
        assert_eq!(found.next_state, state(2));
        assert!(rules.find(state(1), Symbol::One).is_none());
    }
}
