//! Tape alphabet, head directions and machine states.

use std::fmt;

/// Cell value on the tape. [`Symbol::BLANK`] fills every cell the tape grows
/// into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// `0`, also the blank symbol
    Zero,
    /// `1`
    One,
}

impl Symbol {
    /// Symbol assumed for cells beyond the written tape.
    pub const BLANK: Self = Self::Zero;

    /// Parse `0` or `1`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            _ => None,
        }
    }

    /// Character form.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Head movement after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards index 0, floored at 0. Encoded `0`.
    Left,
    /// Towards the end of the tape. Encoded `1`.
    Right,
}

impl Direction {
    /// Parse the rule encoding: `0` is left, `1` is right.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Left),
            '1' => Some(Self::Right),
            _ => None,
        }
    }

    /// Rule encoding.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Left => '0',
            Self::Right => '1',
        }
    }
}

/// Machine state, a single decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u8);

impl StateId {
    /// Largest representable state.
    pub const MAX: u8 = 9;

    /// State `value`, or `None` if it is above [`StateId::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX { Some(Self(value)) } else { None }
    }

    pub(crate) const fn from_const(value: u8) -> Self {
        assert!(value <= Self::MAX);
        Self(value)
    }

    /// Parse a single decimal digit.
    #[must_use]
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::new(d as u8))
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Digit form.
    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_parse_binary_only() {
        assert_eq!(Symbol::from_char('0'), Some(Symbol::Zero));
        assert_eq!(Symbol::from_char('1'), Some(Symbol::One));
        assert_eq!(Symbol::from_char('2'), None);
        assert_eq!(Symbol::BLANK.as_char(), '0');
    }

    #[test]
    fn state_ids_are_single_digits() {
        assert_eq!(StateId::new(9).map(StateId::get), Some(9));
        assert_eq!(StateId::new(10), None);
        assert_eq!(StateId::from_digit('7').map(StateId::get), Some(7));
        assert_eq!(StateId::from_digit('a'), None);
        assert_eq!(StateId::from_const(4).as_char(), '4');
    }

    #[test]
    fn directions_use_rule_encoding() {
        assert_eq!(Direction::from_char('0'), Some(Direction::Left));
        assert_eq!(Direction::from_char('1'), Some(Direction::Right));
        assert_eq!(Direction::from_char('R'), None);
        assert_eq!(Direction::Right.as_char(), '1');
    }
}
