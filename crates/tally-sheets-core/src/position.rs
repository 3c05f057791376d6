//! Cell positions and A1-style address conversion

use crate::error::{Error, Result};
use crate::value::CellError;
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell position: (row, column), 0-based
///
/// Positions are the identity keys of a sheet: cells are stored and refer to
/// each other by position, never by reference. A position can be
/// *representable but invalid*: a formula reference like `ZZZZZ1` parses
/// into a position outside the sheet limits, which evaluates to `#REF!`
/// instead of failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u32,
}

impl Position {
    /// The canonical out-of-range position
    pub const INVALID: Position = Position {
        row: u32::MAX,
        col: u32::MAX,
    };

    /// Create a new position
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Whether this position lies within the sheet limits
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use tally_sheets_core::Position;
    ///
    /// let pos = Position::parse("A1").unwrap();
    /// assert_eq!(pos.row, 0);
    /// assert_eq!(pos.col, 0);
    ///
    /// let pos = Position::parse("C10").unwrap();
    /// assert_eq!(pos.row, 9);
    /// assert_eq!(pos.col, 2);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..pos])?;

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in display, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Parse an A1-style cell reference leniently
    ///
    /// The shape must be column letters followed by digits, but coordinates
    /// beyond the sheet limits produce [`Position::INVALID`] rather than an
    /// error. Formula parsing uses this so an oversized reference surfaces as
    /// `#REF!` at evaluation time instead of a parse failure.
    pub fn parse_reference(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == 0 || pos == bytes.len() {
            return None;
        }
        if !bytes[pos..].iter().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut col: u64 = 0;
        for &b in &bytes[..pos] {
            col = col * 26 + (b.to_ascii_uppercase() - b'A') as u64 + 1;
            if col > MAX_COLS as u64 {
                return Some(Self::INVALID);
            }
        }

        let row: u64 = match s[pos..].parse() {
            Ok(n) => n,
            Err(_) => return Some(Self::INVALID),
        };
        if row == 0 || row > MAX_ROWS as u64 {
            return Some(Self::INVALID);
        }

        Some(Self::new(row as u32 - 1, col as u32 - 1))
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .saturating_mul(26)
                .saturating_add(c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        }

        let col = col - 1; // Convert to 0-based

        if col >= MAX_COLS as u64 {
            return Err(Error::ColumnOutOfBounds(
                col.min(u32::MAX as u64) as u32,
                MAX_COLS - 1,
            ));
        }

        Ok(col as u32)
    }

    /// Format as an A1-style string; invalid positions render as `#REF!`
    pub fn to_a1_string(&self) -> String {
        if !self.is_valid() {
            return CellError::Ref.as_str().to_string();
        }
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(Position::column_to_letters(0), "A");
        assert_eq!(Position::column_to_letters(1), "B");
        assert_eq!(Position::column_to_letters(25), "Z");
        assert_eq!(Position::column_to_letters(26), "AA");
        assert_eq!(Position::column_to_letters(27), "AB");
        assert_eq!(Position::column_to_letters(701), "ZZ");
        assert_eq!(Position::column_to_letters(702), "AAA");
        assert_eq!(Position::column_to_letters(16383), "XFD"); // Max column
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(Position::letters_to_column("A").unwrap(), 0);
        assert_eq!(Position::letters_to_column("B").unwrap(), 1);
        assert_eq!(Position::letters_to_column("Z").unwrap(), 25);
        assert_eq!(Position::letters_to_column("AA").unwrap(), 26);
        assert_eq!(Position::letters_to_column("AB").unwrap(), 27);
        assert_eq!(Position::letters_to_column("ZZ").unwrap(), 701);
        assert_eq!(Position::letters_to_column("AAA").unwrap(), 702);
        assert_eq!(Position::letters_to_column("XFD").unwrap(), 16383);

        // Case insensitive
        assert_eq!(Position::letters_to_column("a").unwrap(), 0);
        assert_eq!(Position::letters_to_column("aa").unwrap(), 26);

        // Out of bounds
        assert!(Position::letters_to_column("XFE").is_err());
        assert!(Position::letters_to_column("AAAAAAAAAAAAAAAAAA").is_err());
    }

    #[test]
    fn test_position_parse() {
        let pos = Position::parse("A1").unwrap();
        assert_eq!(pos.row, 0);
        assert_eq!(pos.col, 0);

        let pos = Position::parse("B2").unwrap();
        assert_eq!(pos.row, 1);
        assert_eq!(pos.col, 1);

        let pos = Position::parse("c100").unwrap();
        assert_eq!(pos.row, 99);
        assert_eq!(pos.col, 2);

        let pos = Position::parse("XFD1048576").unwrap();
        assert_eq!(pos.row, 1_048_575);
        assert_eq!(pos.col, 16_383);
    }

    #[test]
    fn test_position_parse_errors() {
        assert!(Position::parse("").is_err());
        assert!(Position::parse("A").is_err());
        assert!(Position::parse("1").is_err());
        assert!(Position::parse("A0").is_err()); // Row 0 is invalid
        assert!(Position::parse("A1048577").is_err()); // Row too large
        assert!(Position::parse("XFE1").is_err()); // Column too large
        assert!(Position::parse("A1B").is_err()); // Trailing garbage
        assert!(Position::parse("$A$1").is_err()); // No absolute markers
    }

    #[test]
    fn test_parse_reference_lenient() {
        let pos = Position::parse_reference("A1").unwrap();
        assert_eq!(pos, Position::new(0, 0));

        let pos = Position::parse_reference("zz10").unwrap();
        assert_eq!(pos, Position::new(9, 701));

        // Well-formed but out of range: representable, not an error
        assert_eq!(Position::parse_reference("A0"), Some(Position::INVALID));
        assert_eq!(Position::parse_reference("XFE1"), Some(Position::INVALID));
        assert_eq!(
            Position::parse_reference("A1048577"),
            Some(Position::INVALID)
        );
        assert_eq!(
            Position::parse_reference("B99999999999999999999"),
            Some(Position::INVALID)
        );

        // Malformed shapes are not references at all
        assert_eq!(Position::parse_reference(""), None);
        assert_eq!(Position::parse_reference("A"), None);
        assert_eq!(Position::parse_reference("12"), None);
        assert_eq!(Position::parse_reference("1A"), None);
        assert_eq!(Position::parse_reference("A1B"), None);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(0, 0).to_string(), "A1");
        assert_eq!(Position::new(99, 2).to_string(), "C100");
        assert_eq!(Position::new(9, 701).to_string(), "ZZ10");
        assert_eq!(Position::INVALID.to_string(), "#REF!");
        assert_eq!(Position::new(MAX_ROWS, 0).to_string(), "#REF!");
    }

    #[test]
    fn test_validity() {
        assert!(Position::new(0, 0).is_valid());
        assert!(Position::new(MAX_ROWS - 1, MAX_COLS - 1).is_valid());
        assert!(!Position::new(MAX_ROWS, 0).is_valid());
        assert!(!Position::new(0, MAX_COLS).is_valid());
        assert!(!Position::INVALID.is_valid());
    }
}
