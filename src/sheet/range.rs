//! Cell addresses and rectangular ranges in A1 notation.
//!
//! Addresses are zero-based internally; the A1 string form is one-based
//! with letters for columns, as in worksheet XML. Ranges normalize on
//! construction so the start corner is never past the end corner on either
//! axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// Highest addressable zero-based column (`XFD`).
pub const MAX_COLUMN: u32 = 16_383;
/// Highest addressable zero-based row (worksheet row 1048576).
pub const MAX_ROW: u32 = 1_048_575;

/// A single cell position, zero-based in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    /// Zero-based column index
    pub column: u32,
    /// Zero-based row index
    pub row: u32,
}

impl CellAddress {
    /// Create an address from zero-based column and row indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::sheet::range::CellAddress;
    /// let a = CellAddress::new(2, 4).unwrap();
    /// assert_eq!(a.to_string(), "C5");
    /// ```
    pub fn new(column: u32, row: u32) -> Result<Self> {
        if column > MAX_COLUMN || row > MAX_ROW {
            return Err(Error::Range(format!(
                "cell address ({column}, {row}) exceeds the worksheet bounds"
            )));
        }
        Ok(Self { column, row })
    }

    /// Convert a zero-based column index to its letter form (`0` -> `A`,
    /// `26` -> `AA`).
    pub fn column_letters(mut column: u32) -> String {
        let mut letters = [0u8; 3];
        let mut len = 0;
        loop {
            letters[len] = b'A' + (column % 26) as u8;
            len += 1;
            if column < 26 {
                break;
            }
            column = column / 26 - 1;
        }
        letters[..len].iter().rev().map(|&b| b as char).collect()
    }

    /// Parse a column letter run (`A`..`XFD`) to its zero-based index.
    pub fn parse_column_letters(letters: &str) -> Result<u32> {
        if letters.is_empty() || letters.len() > 3 {
            return Err(Error::Range(format!("invalid column letters `{letters}`")));
        }
        let mut column: u32 = 0;
        for c in letters.chars() {
            let c = c.to_ascii_uppercase();
            if !c.is_ascii_uppercase() {
                return Err(Error::Range(format!("invalid column letters `{letters}`")));
            }
            column = column * 26 + (c as u32 - 'A' as u32 + 1);
        }
        let column = column - 1;
        if column > MAX_COLUMN {
            return Err(Error::Range(format!("column `{letters}` is out of bounds")));
        }
        Ok(column)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.column), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let letter_len = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        let (letters, digits) = s.split_at(letter_len);
        if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Range(format!("invalid cell address `{s}`")));
        }
        let column = Self::parse_column_letters(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::Range(format!("invalid row in `{s}`")))?;
        if row == 0 {
            return Err(Error::Range(format!("row numbers start at 1 in `{s}`")));
        }
        Self::new(column, row - 1)
    }
}

/// A rectangular cell range, normalized so `start <= end` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl Range {
    /// Create a range from two corner addresses, normalizing corner order.
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress {
                column: a.column.min(b.column),
                row: a.row.min(b.row),
            },
            end: CellAddress {
                column: a.column.max(b.column),
                row: a.row.max(b.row),
            },
        }
    }

    /// Range covering a single cell.
    #[inline]
    pub fn single(address: CellAddress) -> Self {
        Self {
            start: address,
            end: address,
        }
    }

    /// Range from zero-based column and row bounds, all inclusive.
    pub fn from_bounds(start_col: u32, start_row: u32, end_col: u32, end_row: u32) -> Result<Self> {
        Ok(Self::new(
            CellAddress::new(start_col, start_row)?,
            CellAddress::new(end_col, end_row)?,
        ))
    }

    /// Number of columns spanned.
    #[inline]
    pub fn width(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Number of rows spanned.
    #[inline]
    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of cells covered.
    #[inline]
    pub fn cell_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Whether this range shares at least one cell with `other`.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start.column <= other.end.column
            && other.start.column <= self.end.column
            && self.start.row <= other.end.row
            && other.start.row <= self.end.row
    }

    /// Whether `address` lies inside this range.
    pub fn contains_address(&self, address: &CellAddress) -> bool {
        (self.start.column..=self.end.column).contains(&address.column)
            && (self.start.row..=self.end.row).contains(&address.row)
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains_address(&other.start) && self.contains_address(&other.end)
    }

    /// The shared rectangle of two ranges, if any.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Range {
            start: CellAddress {
                column: self.start.column.max(other.start.column),
                row: self.start.row.max(other.start.row),
            },
            end: CellAddress {
                column: self.end.column.min(other.end.column),
                row: self.end.row.min(other.end.row),
            },
        })
    }

    /// Iterate all addresses covered, row-major.
    pub fn addresses(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.column..=self.end.column).map(move |column| CellAddress { column, row })
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(a.parse()?, b.parse()?)),
            // single-cell form without the colon
            None => Ok(Self::single(s.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_letters(0), "A");
        assert_eq!(CellAddress::column_letters(25), "Z");
        assert_eq!(CellAddress::column_letters(26), "AA");
        assert_eq!(CellAddress::column_letters(701), "ZZ");
        assert_eq!(CellAddress::column_letters(702), "AAA");
        assert_eq!(CellAddress::column_letters(MAX_COLUMN), "XFD");
    }

    #[test]
    fn test_address_roundtrip() {
        for s in ["A1", "Z99", "AA100", "XFD1048576"] {
            let addr: CellAddress = s.parse().unwrap();
            assert_eq!(addr.to_string(), s);
        }
    }

    #[test]
    fn test_address_rejects_malformed() {
        for s in ["", "1A", "A0", "A", "7", "A-3", "XFE1"] {
            assert!(s.parse::<CellAddress>().is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn test_range_normalizes() {
        let r: Range = "C4:A1".parse().unwrap();
        assert_eq!(r.to_string(), "A1:C4");
        assert_eq!(r.width(), 3);
        assert_eq!(r.height(), 4);
        assert_eq!(r.cell_count(), 12);
    }

    #[test]
    fn test_single_cell_parse() {
        let r: Range = "B2".parse().unwrap();
        assert_eq!(r.start, r.end);
        assert_eq!(r.to_string(), "B2:B2");
    }

    #[test]
    fn test_overlap_and_containment() {
        let a: Range = "A1:C4".parse().unwrap();
        let b: Range = "C4:E6".parse().unwrap();
        let c: Range = "D1:E2".parse().unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains_address(&"B2".parse().unwrap()));
        assert!(!a.contains_address(&"D2".parse().unwrap()));
        assert!(a.contains_range(&"A1:B2".parse().unwrap()));
        assert!(!a.contains_range(&b));
        assert_eq!(a.intersection(&b), Some("C4:C4".parse().unwrap()));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_addresses_iteration() {
        let r: Range = "A1:B2".parse().unwrap();
        let cells: Vec<String> = r.addresses().map(|a| a.to_string()).collect();
        assert_eq!(cells, ["A1", "B1", "A2", "B2"]);
    }
}
