//! Cell addresses, ranges and locators

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// Rows and columns are 0-based internally. The `$` markers are kept so a
/// parsed formula prints back the way it was written; they do not change
/// which cell is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create an absolute cell address ($A$1 style)
    pub fn absolute(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: true,
            col_absolute: true,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use tabula_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B2").unwrap();
    /// assert_eq!((addr.row, addr.col), (1, 1));
    /// assert!(addr.col_absolute && !addr.row_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (col_absolute, rest) = match s.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if letters_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let col = Self::letters_to_column(&rest[..letters_end])?;

        let (row_absolute, digits) = match rest[letters_end..].strip_prefix('$') {
            Some(digits) => (true, digits),
            None => (false, &rest[letters_end..]),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::RowOutOfBounds(u32::MAX, MAX_ROWS))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        if row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }

        Ok(Self {
            row: row - 1,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::with_capacity(3);
        let mut n = col as u32 + 1;
        while n > 0 {
            n -= 1;
            letters.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
            }
        }

        Ok((col - 1) as u16)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col_absolute {
            f.write_str("$")?;
        }
        f.write_str(&Self::column_to_letters(self.col))?;
        if self.row_absolute {
            f.write_str("$")?;
        }
        write!(f, "{}", self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so `start` is the top-left corner.
    ///
    /// Absolute markers stay attached to the corner they were written on.
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        let mut start = start;
        let mut end = end;
        if start.row > end.row {
            std::mem::swap(&mut start.row, &mut end.row);
            std::mem::swap(&mut start.row_absolute, &mut end.row_absolute);
        }
        if start.col > end.col {
            std::mem::swap(&mut start.col, &mut end.col);
            std::mem::swap(&mut start.col_absolute, &mut end.col_absolute);
        }
        Self { start, end }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation (a lone address is a 1x1 range)
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::parse(start.trim())?,
                CellAddress::parse(end.trim())?,
            )),
            None => Ok(Self::single(CellAddress::parse(s.trim())?)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Number of cells in the range
    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.col_count())
    }

    /// Iterate the range row by row, yielding each row's addresses
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = CellAddress>> {
        let (cols_from, cols_to) = (self.start.col, self.end.col);
        (self.start.row..=self.end.row)
            .map(move |row| (cols_from..=cols_to).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Where a reference points: one cell or a rectangular range, optionally on a
/// named sheet. `None` means the sheet the formula is evaluated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Locator {
    /// A single cell (`A1`, `Sheet1!$B$2`)
    Cell {
        sheet: Option<String>,
        address: CellAddress,
    },
    /// A range written with `:` (`A1:B3`); `A1:A1` stays a range
    Range {
        sheet: Option<String>,
        range: CellRange,
    },
}

impl Locator {
    /// Locator for a cell on the current sheet
    pub fn cell(address: CellAddress) -> Self {
        Locator::Cell {
            sheet: None,
            address,
        }
    }

    /// Locator for a range on the current sheet
    pub fn range(range: CellRange) -> Self {
        Locator::Range { sheet: None, range }
    }

    /// Qualify this locator with a sheet name
    pub fn on_sheet<S: Into<String>>(self, name: S) -> Self {
        let sheet = Some(name.into());
        match self {
            Locator::Cell { address, .. } => Locator::Cell { sheet, address },
            Locator::Range { range, .. } => Locator::Range { sheet, range },
        }
    }

    /// Sheet qualifier, if any
    pub fn sheet(&self) -> Option<&str> {
        match self {
            Locator::Cell { sheet, .. } | Locator::Range { sheet, .. } => sheet.as_deref(),
        }
    }

    /// The covered area as a range (1x1 for a cell)
    pub fn area(&self) -> CellRange {
        match self {
            Locator::Cell { address, .. } => CellRange::single(*address),
            Locator::Range { range, .. } => *range,
        }
    }

    /// Top-left cell, used when a range has to stand in for a single value
    pub fn top_left(&self) -> CellAddress {
        self.area().start
    }

    /// Locator of the top-left cell, on the same sheet
    pub fn top_left_cell(&self) -> Locator {
        Locator::Cell {
            sheet: self.sheet().map(str::to_string),
            address: self.top_left(),
        }
    }

    /// Whether this locator was written as a range
    pub fn is_range(&self) -> bool {
        matches!(self, Locator::Range { .. })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = self.sheet() {
            write_sheet_name(f, sheet)?;
            f.write_str("!")?;
        }
        match self {
            Locator::Cell { address, .. } => write!(f, "{}", address),
            Locator::Range { range, .. } => write!(f, "{}", range),
        }
    }
}

/// Sheet names that are not plain identifiers have to be quoted in formulas.
fn write_sheet_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if plain {
        f.write_str(name)
    } else {
        write!(f, "'{}'", name.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters_round_trip() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");

        assert_eq!(CellAddress::letters_to_column("a").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("AB").unwrap(), 27);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);
        assert!(CellAddress::letters_to_column("XFE").is_err());
        assert!(CellAddress::letters_to_column("ZZZZZZZ").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("$C$10").unwrap();
        assert_eq!((addr.row, addr.col), (9, 2));
        assert!(addr.row_absolute && addr.col_absolute);

        let addr = CellAddress::parse("b$7").unwrap();
        assert!(addr.row_absolute && !addr.col_absolute);

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!((addr.row, addr.col), (1_048_575, 16383));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
        assert!(CellAddress::parse("A99999999999").is_err());
        assert!(CellAddress::parse("A1B").is_err());
    }

    #[test]
    fn test_display_keeps_absolute_markers() {
        assert_eq!(CellAddress::parse("$a$1").unwrap().to_string(), "$A$1");
        assert_eq!(CellAddress::new(99, 2).to_string(), "C100");
    }

    #[test]
    fn test_range_is_normalized() {
        let range = CellRange::parse("C3:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(2, 2));
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.col_count(), 3);
        assert!(range.contains(&CellAddress::new(1, 1)));
        assert!(!range.contains(&CellAddress::new(3, 0)));
    }

    #[test]
    fn test_range_rows() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.map(|a| a.to_string()).collect())
            .collect();
        assert_eq!(cells, vec![vec!["A1", "B1"], vec!["A2", "B2"]]);
    }

    #[test]
    fn test_locator_display() {
        let loc = Locator::cell(CellAddress::new(0, 0));
        assert_eq!(loc.to_string(), "A1");

        let loc = Locator::range(CellRange::parse("A1:B2").unwrap()).on_sheet("Data");
        assert_eq!(loc.to_string(), "Data!A1:B2");

        let loc = Locator::cell(CellAddress::new(0, 0)).on_sheet("Q1 'plan'");
        assert_eq!(loc.to_string(), "'Q1 ''plan'''!A1");

        let loc = Locator::cell(CellAddress::new(0, 0)).on_sheet("2024");
        assert_eq!(loc.to_string(), "'2024'!A1");
    }

    #[test]
    fn test_locator_top_left() {
        let loc = Locator::range(CellRange::parse("B2:D4").unwrap()).on_sheet("S");
        assert_eq!(loc.top_left(), CellAddress::new(1, 1));
        assert_eq!(loc.top_left_cell().to_string(), "S!B2");
        assert!(loc.is_range());
    }
}
