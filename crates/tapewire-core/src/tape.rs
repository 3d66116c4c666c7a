//! Self-extending binary tape.

use std::{fmt, str::FromStr};

use crate::{error::TapeError, symbol::Symbol};

/// Finite tape that grows to the right and never shrinks.
///
/// Cells past the end read as [`Symbol::BLANK`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Symbol>,
}

impl Tape {
    /// Empty tape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of written cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cell has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Symbol at `pos`, blank outside the tape.
    #[must_use]
    pub fn get(&self, pos: usize) -> Symbol {
        self.cells.get(pos).copied().unwrap_or(Symbol::BLANK)
    }

    /// Write `symbol` at `pos`, growing the tape with blanks up to `pos`.
    pub fn write(&mut self, pos: usize, symbol: Symbol) {
        if pos >= self.cells.len() {
            self.cells.resize(pos + 1, Symbol::BLANK);
        }
        self.cells[pos] = symbol;
    }

    /// Cells in order.
    #[must_use]
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Tape text with the cell under `head` bracketed, e.g. `01[1]0`.
    ///
    /// A head past the end renders as a trailing `[ ]`, so the empty tape is
    /// `[ ]`.
    #[must_use]
    pub fn render_with_head(&self, head: usize) -> String {
        let mut out = String::with_capacity(self.cells.len() + 3);
        for (pos, symbol) in self.cells.iter().enumerate() {
            if pos == head {
                out.push('[');
                out.push(symbol.as_char());
                out.push(']');
            } else {
                out.push(symbol.as_char());
            }
        }
        if head >= self.cells.len() {
            out.push_str("[ ]");
        }
        out
    }
}

impl FromStr for Tape {
    type Err = TapeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let cells = text
            .chars()
            .enumerate()
            .map(|(position, found)| {
                Symbol::from_char(found).ok_or(TapeError::InvalidSymbol { found, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }
}

impl From<Vec<Symbol>> for Tape {
    fn from(cells: Vec<Symbol>) -> Self {
        Self { cells }
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let tape: Tape = "0110".parse().unwrap();
        assert_eq!(tape.len(), 4);
        assert_eq!(tape.get(1), Symbol::One);
        assert_eq!(tape.get(99), Symbol::BLANK);
        assert_eq!(tape.to_string(), "0110");
    }

    #[test]
    fn parse_rejects_non_binary() {
        assert_eq!("01a".parse::<Tape>(), Err(TapeError::InvalidSymbol { found: 'a', position: 2 }));
        assert_eq!("".parse::<Tape>(), Ok(Tape::new()));
    }

    #[test]
    fn write_extends_with_blanks() {
        let mut tape: Tape = "1".parse().unwrap();
        tape.write(1, Symbol::One);
        assert_eq!(tape.to_string(), "11");
        tape.write(4, Symbol::One);
        assert_eq!(tape.to_string(), "11001");
    }

    #[test]
    fn render_brackets_head() {
        let tape: Tape = "0110".parse().unwrap();
        assert_eq!(tape.render_with_head(2), "01[1]0");
        assert_eq!(tape.render_with_head(0), "[0]110");
        assert_eq!(tape.render_with_head(4), "0110[ ]");
        assert_eq!(Tape::new().render_with_head(0), "[ ]");
    }
}
