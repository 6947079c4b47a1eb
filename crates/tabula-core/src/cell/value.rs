//! Cell value and error kinds

use std::fmt;

/// A spreadsheet value. Exactly one kind is active at a time.
///
/// Dates and times are plain [`CellValue::Number`]s holding serial-day
/// numbers (see [`crate::serial`]); there is no separate date kind.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Nothing was ever written. Distinct from empty text.
    #[default]
    Blank,

    /// Numeric value (all numbers stored as f64, including dates)
    Number(f64),

    /// Text, kept as text even when it looks numeric
    Text(String),

    /// TRUE/FALSE
    Logical(bool),

    /// In-band error (#VALUE!, #REF!, etc.)
    Error(ErrorKind),
}

impl CellValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the value is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Blank or empty text, the cells COUNTBLANK counts
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Check if the value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// The error kind, if this is an error
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Blank => "blank",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Logical(_) => "logical",
            CellValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Blank => Ok(()),
            CellValue::Number(n) => f.write_str(&crate::coerce::format_general(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Logical(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Logical(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<ErrorKind> for CellValue {
    fn from(e: ErrorKind) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values.
///
/// The discriminants are the numbers `ERROR.TYPE` reports. The external-data
/// error (`#GETTING_DATA`, ordinal 8) is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// #NULL! - Empty intersection of ranges
    Null = 1,
    /// #DIV/0! - Division by zero
    DivisionByZero = 2,
    /// #VALUE! - Wrong type of argument or operand
    Value = 3,
    /// #REF! - Invalid cell reference
    Reference = 4,
    /// #NAME? - Unrecognized function or name
    Name = 5,
    /// #NUM! - Invalid numeric value
    Number = 6,
    /// #N/A - Value not available
    NotAvailable = 7,
}

impl ErrorKind {
    /// Every kind, in ordinal order
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Null,
        ErrorKind::DivisionByZero,
        ErrorKind::Value,
        ErrorKind::Reference,
        ErrorKind::Name,
        ErrorKind::Number,
        ErrorKind::NotAvailable,
    ];

    /// The literal as written in formulas
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Null => "#NULL!",
            ErrorKind::DivisionByZero => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Reference => "#REF!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Number => "#NUM!",
            ErrorKind::NotAvailable => "#N/A",
        }
    }

    /// Parse an error literal (ASCII case-insensitive, otherwise exact)
    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    /// The number `ERROR.TYPE` returns for this kind
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Inverse of [`ErrorKind::ordinal`]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ordinal() == ordinal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
