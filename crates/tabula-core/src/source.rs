//! The boundary between the evaluator and whatever stores cells

use crate::cell::{CellValue, ErrorKind, Locator};

/// Read access to cell values.
///
/// The evaluator only ever sees cells through this trait. Implementations
/// must not change while an evaluation borrows them; the engine takes no
/// locks of its own.
pub trait CellSource {
    /// Value of the cell a locator points at.
    ///
    /// Returns [`CellValue::Blank`] for a cell that was never written and
    /// `#REF!` when the locator names a sheet the source does not have. For a
    /// range locator this is the value of its top-left cell.
    fn lookup(&self, locator: &Locator) -> CellValue;

    /// Values of every cell in the locator's area, row by row
    fn resolve_range(&self, locator: &Locator) -> Vec<Vec<CellValue>> {
        let sheet = locator.sheet().map(str::to_string);
        locator
            .area()
            .rows()
            .map(|row| {
                row.map(|address| {
                    self.lookup(&Locator::Cell {
                        sheet: sheet.clone(),
                        address,
                    })
                })
                .collect()
            })
            .collect()
    }

    /// Number of empty cells (blank or empty text) in the locator's area.
    ///
    /// The default looks at every cell without collecting them. Sources that
    /// store cells sparsely should override it to count only what is stored;
    /// an area can hold over 17 billion cells.
    fn count_empty(&self, locator: &Locator) -> Result<u64, ErrorKind> {
        let sheet = locator.sheet();
        let empty = locator
            .area()
            .rows()
            .flatten()
            .filter(|&address| {
                self.lookup(&Locator::Cell {
                    sheet: sheet.map(str::to_string),
                    address,
                })
                .is_empty()
            })
            .count();
        Ok(empty as u64)
    }

    /// What a defined name refers to, if the source knows the name
    fn defined_name(&self, _name: &str) -> Option<Locator> {
        None
    }
}

impl<T: CellSource + ?Sized> CellSource for &T {
    fn lookup(&self, locator: &Locator) -> CellValue {
        (**self).lookup(locator)
    }

    fn resolve_range(&self, locator: &Locator) -> Vec<Vec<CellValue>> {
        (**self).resolve_range(locator)
    }

    fn count_empty(&self, locator: &Locator) -> Result<u64, ErrorKind> {
        (**self).count_empty(locator)
    }

    fn defined_name(&self, name: &str) -> Option<Locator> {
        (**self).defined_name(name)
    }
}

/// A source with a single sheet that has no cells at all.
///
/// Unqualified references are blank; references into any named sheet are
/// `#REF!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl CellSource for EmptySource {
    fn lookup(&self, locator: &Locator) -> CellValue {
        match locator.sheet() {
            None => CellValue::Blank,
            Some(_) => CellValue::Error(ErrorKind::Reference),
        }
    }

    fn count_empty(&self, locator: &Locator) -> Result<u64, ErrorKind> {
        match locator.sheet() {
            None => Ok(locator.area().cell_count()),
            Some(_) => Err(ErrorKind::Reference),
        }
    }
}
