//! Workbook type - an in-memory set of worksheets usable as a cell source

use ahash::AHashMap;

use crate::cell::{CellValue, ErrorKind, Locator};
use crate::error::{Error, Result};
use crate::source::CellSource;
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook: ordered worksheets, an active sheet and defined names.
///
/// Unqualified references resolve against the active sheet. Sheet and
/// defined-name lookups ignore ASCII case.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
    /// Active sheet index
    active_sheet: usize,
    /// Defined names, keyed by upper-cased name
    names: AHashMap<String, Locator>,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            active_sheet: 0,
            names: AHashMap::new(),
        }
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            active_sheet: 0,
            names: AHashMap::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get(i))
    }

    /// Get a mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get_mut(i))
    }

    /// Get the index of a worksheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Add a new worksheet with a generated name ("Sheet2", ...)
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;
        self.worksheets.push(Worksheet::new(name));
        Ok(self.worksheets.len() - 1)
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        let current = self
            .worksheets
            .get(index)
            .map(|ws| ws.name().to_string())
            .ok_or_else(|| Error::SheetNotFound(format!("#{}", index)))?;
        if !current.eq_ignore_ascii_case(new_name) {
            self.validate_sheet_name(new_name)?;
        }
        if let Some(ws) = self.worksheets.get_mut(index) {
            ws.set_name(new_name);
        }
        Ok(())
    }

    /// Index of the active sheet
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Set the active sheet
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetNotFound(format!("#{}", index)));
        }
        self.active_sheet = index;
        Ok(())
    }

    /// Define a workbook-level name for a cell or range.
    ///
    /// A locator without a sheet keeps following the active sheet.
    pub fn define_name(&mut self, name: &str, refers_to: Locator) -> Result<()> {
        let valid = name
            .chars()
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(Error::InvalidName(name.into()));
        }
        self.names.insert(name.to_ascii_uppercase(), refers_to);
        Ok(())
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot exceed {} characters",
                MAX_SHEET_NAME_LEN
            )));
        }
        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(Error::InvalidSheetName(
                "Sheet name cannot start or end with an apostrophe".into(),
            ));
        }
        if self.sheet_index(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        (self.worksheets.len() + 1..)
            .map(|n| format!("Sheet{}", n))
            .find(|name| self.sheet_index(name).is_none())
            .unwrap_or_default()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// The sheet a locator points into: its named sheet, else the active one
    fn target_sheet(&self, locator: &Locator) -> std::result::Result<&Worksheet, ErrorKind> {
        let sheet = match locator.sheet() {
            Some(name) => self.worksheet_by_name(name),
            None => self.worksheets.get(self.active_sheet),
        };
        sheet.ok_or_else(|| {
            log::debug!("reference {} names no sheet of this workbook", locator);
            ErrorKind::Reference
        })
    }
}

impl CellSource for Workbook {
    fn lookup(&self, locator: &Locator) -> CellValue {
        match self.target_sheet(locator) {
            Ok(ws) => ws.value_for(locator),
            Err(e) => CellValue::Error(e),
        }
    }

    fn count_empty(&self, locator: &Locator) -> std::result::Result<u64, ErrorKind> {
        let ws = self.target_sheet(locator)?;
        Ok(ws.count_empty_in(&locator.area()))
    }

    fn defined_name(&self, name: &str) -> Option<Locator> {
        self.names.get(&name.to_ascii_uppercase()).cloned()
    }
}
