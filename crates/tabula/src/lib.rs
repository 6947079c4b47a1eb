//! # tabula
//!
//! A spreadsheet formula engine.
//!
//! Tabula parses spreadsheet formulas and evaluates them against cell data,
//! following the value model and coercion rules of the common spreadsheet
//! applications.
//!
//! ## Features
//!
//! - Workbooks and worksheets holding numbers, text, logicals and errors
//! - Formula tokenizing and parsing into a printable AST
//! - Evaluation with in-band spreadsheet errors (`#DIV/0!`, `#N/A`, ...)
//! - The information functions (`ISBLANK`, `ISERR`, `ISNUMBER`, `N`,
//!   `ERROR.TYPE`, ...) plus a handful of logical, date and reference
//!   functions
//! - A pluggable [`CellSource`] so formulas can run against any storage
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! // Create a new workbook
//! let mut workbook = Workbook::new();
//!
//! // Get the first worksheet
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Set cell values
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//! sheet.set_cell_input("C1", "$12,235.5").unwrap();
//!
//! // Evaluate formulas against it
//! assert_eq!(workbook.calculate("=ISTEXT(A1)").unwrap(), CellValue::Logical(true));
//! assert_eq!(workbook.calculate("=ISEVEN(B1)").unwrap(), CellValue::Logical(true));
//! assert_eq!(workbook.calculate("=C1*2").unwrap(), CellValue::Number(24471.0));
//! assert_eq!(
//!     workbook.calculate("=ERROR.TYPE(1/0)").unwrap(),
//!     CellValue::Number(2.0)
//! );
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    evaluate_formula, evaluate_formula_with, CalculationOptions, WorkbookCalculationExt,
};

// Re-export core types
pub use tabula_core::{
    serial,
    // Cell types
    CellAddress,
    CellRange,
    // Source boundary
    CellSource,
    CellValue,
    EmptySource,
    // Error types
    Error,
    ErrorKind,
    Locator,
    Result,
    // Main types
    Workbook,
    Worksheet,

    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export formula types
pub use tabula_formula::{
    builtin_registry, evaluate, parse, parse_formula, parse_formula_with, tokenize, ArgMode,
    Argument, BinaryOperator, EvaluationContext, FormulaError, FormulaExpr, FormulaResult,
    FunctionDef, FunctionRegistry, LexError, ParseError, ParserOptions, Token, TokenKind,
    UnaryOperator, DEFAULT_MAX_DEPTH, NESTING_COST,
};
