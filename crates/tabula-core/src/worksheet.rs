//! Worksheet type

use ahash::AHashMap;
use chrono::NaiveDateTime;

use crate::cell::{CellAddress, CellRange, CellValue, ErrorKind, Locator};
use crate::coerce::{parse_logical_text, parse_number_text};
use crate::error::{Error, Result};
use crate::serial;
use crate::source::CellSource;
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet of cell values.
///
/// Only written cells are stored. Writing [`CellValue::Blank`] removes the
/// cell, so a blank lookup always means "never written".
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Written cells keyed by (row, col)
    cells: AHashMap<(u32, u16), CellValue>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: AHashMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get a cell value by A1 address
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by 0-based row and column
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(&(row, col)).cloned().unwrap_or_default()
    }

    /// Whether anything is stored at the given position
    pub fn is_written_at(&self, row: u32, col: u16) -> bool {
        self.cells.contains_key(&(row, col))
    }

    /// Set a cell value by A1 address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by 0-based row and column
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }

        match value.into() {
            CellValue::Blank => {
                self.cells.remove(&(row, col));
            }
            value => {
                self.cells.insert((row, col), value);
            }
        }
        Ok(())
    }

    /// Store a date and time as its serial-day number
    pub fn set_cell_date(&mut self, address: &str, datetime: NaiveDateTime) -> Result<()> {
        let value = serial::from_datetime(datetime)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Error(ErrorKind::Number));
        self.set_cell_value(address, value)
    }

    /// Store text the way a user typing it into the cell would.
    ///
    /// Numeric, currency, grouped and percent text becomes a number,
    /// `TRUE`/`FALSE` a logical and an error literal an error. A leading
    /// apostrophe forces the rest to stay text. Empty input clears the cell.
    pub fn set_cell_input(&mut self, address: &str, input: &str) -> Result<()> {
        self.set_cell_value(address, value_from_input(input))
    }

    /// Clear a cell
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        self.set_cell_value(address, CellValue::Blank)
    }

    /// Number of written cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Value for a locator already known to target this sheet
    pub(crate) fn value_for(&self, locator: &Locator) -> CellValue {
        let top_left = locator.top_left();
        self.get_value_at(top_left.row, top_left.col)
    }

    /// Empty cells in a range of this sheet, from whichever is smaller: the
    /// range or the stored cells
    pub(crate) fn count_empty_in(&self, range: &CellRange) -> u64 {
        let area = range.cell_count();
        if area <= self.cells.len() as u64 {
            let empty = range
                .rows()
                .flatten()
                .filter(|address| self.get_value_at(address.row, address.col).is_empty())
                .count();
            return empty as u64;
        }

        let filled = self
            .cells
            .iter()
            .filter(|((row, col), value)| {
                !value.is_empty() && range.contains(&CellAddress::new(*row, *col))
            })
            .count();
        area - filled as u64
    }
}

/// A worksheet on its own resolves unqualified references and references
/// qualified with its own name; every other sheet is `#REF!`.
impl CellSource for Worksheet {
    fn lookup(&self, locator: &Locator) -> CellValue {
        match locator.sheet() {
            Some(sheet) if !sheet.eq_ignore_ascii_case(&self.name) => {
                CellValue::Error(ErrorKind::Reference)
            }
            _ => self.value_for(locator),
        }
    }

    fn count_empty(&self, locator: &Locator) -> std::result::Result<u64, ErrorKind> {
        match locator.sheet() {
            Some(sheet) if !sheet.eq_ignore_ascii_case(&self.name) => Err(ErrorKind::Reference),
            _ => Ok(self.count_empty_in(&locator.area())),
        }
    }
}

fn value_from_input(input: &str) -> CellValue {
    if let Some(text) = input.strip_prefix('\'') {
        return CellValue::text(text);
    }
    if input.is_empty() {
        return CellValue::Blank;
    }
    if let Some(kind) = ErrorKind::from_literal(input.trim()) {
        return CellValue::Error(kind);
    }
    if let Some(b) = parse_logical_text(input.trim()) {
        return CellValue::Logical(b);
    }
    match parse_number_text(input) {
        Some(n) => CellValue::Number(n),
        None => CellValue::text(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("B2", 42.0).unwrap();
        assert_eq!(ws.get_value("B2").unwrap(), CellValue::Number(42.0));
        assert_eq!(ws.get_value("A1").unwrap(), CellValue::Blank);
        assert!(ws.is_written_at(1, 1));
        assert_eq!(ws.cell_count(), 1);
    }

    #[test]
    fn test_writing_blank_clears() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("A1", "x").unwrap();
        ws.clear_cell("A1").unwrap();
        assert!(!ws.is_written_at(0, 0));
        assert_eq!(ws.cell_count(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut ws = Worksheet::new("Sheet1");
        assert!(ws.set_cell_value("A0", 1.0).is_err());
        assert_eq!(
            ws.set_cell_value_at(MAX_ROWS, 0, 1.0),
            Err(Error::RowOutOfBounds(MAX_ROWS, MAX_ROWS - 1))
        );
    }

    #[test]
    fn test_set_cell_input_types_values() {
        let mut ws = Worksheet::new("Sheet1");
        let cases = [
            ("123", CellValue::Number(123.0)),
            ("12,235.5", CellValue::Number(12235.5)),
            ("$12,235.5", CellValue::Number(12235.5)),
            ("12%", CellValue::Number(0.12)),
            ("true", CellValue::Logical(true)),
            ("#N/A", CellValue::Error(ErrorKind::NotAvailable)),
            ("asd", CellValue::text("asd")),
            ("'123", CellValue::text("123")),
            ("", CellValue::Blank),
        ];
        for (input, expected) in cases {
            ws.set_cell_input("A1", input).unwrap();
            assert_eq!(ws.get_value("A1").unwrap(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_set_cell_date() {
        let mut ws = Worksheet::new("Sheet1");
        let dt = NaiveDate::from_ymd_opt(2008, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ws.set_cell_date("A1", dt).unwrap();
        assert_eq!(ws.get_value("A1").unwrap(), CellValue::Number(39448.5));
    }

    #[test]
    fn test_lookup_as_source() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value("A1", 7.0).unwrap();
        let range = Locator::range(CellRange::parse("A1:B2").unwrap());

        assert_eq!(ws.lookup(&range), CellValue::Number(7.0));
        assert_eq!(ws.lookup(&range.clone().on_sheet("data")), CellValue::Number(7.0));
        assert_eq!(
            ws.lookup(&range.on_sheet("Other")),
            CellValue::Error(ErrorKind::Reference)
        );
    }

    #[test]
    fn test_count_empty() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value("A1", 1.0).unwrap();
        ws.set_cell_value("B1", "").unwrap();
        ws.set_cell_value("C3", "x").unwrap();
        ws.set_cell_value("Z100", true).unwrap();

        let small = Locator::range(CellRange::parse("A1:C3").unwrap());
        assert_eq!(ws.count_empty(&small), Ok(7));
        let column = Locator::range(CellRange::parse("B1:B2").unwrap());
        assert_eq!(ws.count_empty(&column), Ok(2));

        let whole_sheet = Locator::range(CellRange::parse("A1:XFD1048576").unwrap());
        assert_eq!(ws.count_empty(&whole_sheet), Ok(17_179_869_184 - 3));
        assert_eq!(
            ws.count_empty(&whole_sheet.clone().on_sheet("DATA")),
            Ok(17_179_869_184 - 3)
        );
        assert_eq!(
            ws.count_empty(&whole_sheet.on_sheet("Other")),
            Err(ErrorKind::Reference)
        );
    }
}
