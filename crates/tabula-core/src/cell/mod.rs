//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] and [`ErrorKind`] - the closed set of value and error kinds
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Locator`] - what a formula reference points at

mod address;
mod value;

pub use address::{CellAddress, CellRange, Locator};
pub use value::{CellValue, ErrorKind};
