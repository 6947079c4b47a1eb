//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellRange,
    CellSource,
    CellValue,
    ErrorKind,
    Locator,

    // Formula types
    EvaluationContext,
    FormulaError,
    FormulaExpr,

    // Error types
    Error,
    Result,

    // Main types
    Workbook,
    // Extension traits
    WorkbookCalculationExt,
    Worksheet,
};
