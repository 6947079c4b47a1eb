//! # tabula-core
//!
//! Core data structures for the tabula formula engine.
//!
//! This crate provides the fundamental types the engine works with:
//! - [`CellValue`] and [`ErrorKind`] - the five value kinds and seven error kinds
//! - [`CellAddress`], [`CellRange`] and [`Locator`] - cell addressing
//! - [`CellSource`] - read access to cells during evaluation
//! - [`Workbook`], [`Worksheet`] - an in-memory cell source
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! // Typed the way a user would type it into the cell
//! sheet.set_cell_input("C1", "$12,235.5").unwrap();
//! assert_eq!(sheet.get_value("C1").unwrap(), CellValue::Number(12235.5));
//! ```

pub mod cell;
pub mod coerce;
pub mod error;
pub mod serial;
pub mod source;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellValue, ErrorKind, Locator};
pub use coerce::{format_general, parse_logical_text, parse_number_text, CalcResult};
pub use error::{Error, Result};
pub use source::{CellSource, EmptySource};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
