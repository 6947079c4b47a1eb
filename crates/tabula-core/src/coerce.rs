//! Coercion between value kinds
//!
//! Every coercion of an [`CellValue::Error`] returns that same error without
//! looking at the target kind, so callers can use `?` and never lose an
//! error on the way.

use crate::cell::{CellValue, ErrorKind};
use lazy_regex::regex_captures;
use std::borrow::Cow;

/// Result of a computation that may end in an in-band spreadsheet error
pub type CalcResult<T = CellValue> = std::result::Result<T, ErrorKind>;

impl CellValue {
    /// Coerce to a number.
    ///
    /// Text goes through [`parse_number_text`]; text that is not numeric is
    /// `#VALUE!`.
    pub fn to_number(&self) -> CalcResult<f64> {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Logical(b) => Ok(if *b { 1.0 } else { 0.0 }),
            CellValue::Blank => Ok(0.0),
            CellValue::Text(s) => parse_number_text(s).ok_or(ErrorKind::Value),
            CellValue::Error(e) => Err(*e),
        }
    }

    /// Coerce to text. Numbers use the general format.
    pub fn to_text(&self) -> CalcResult<Cow<'_, str>> {
        match self {
            CellValue::Number(n) => Ok(Cow::Owned(format_general(*n))),
            CellValue::Text(s) => Ok(Cow::Borrowed(s)),
            CellValue::Logical(true) => Ok(Cow::Borrowed("TRUE")),
            CellValue::Logical(false) => Ok(Cow::Borrowed("FALSE")),
            CellValue::Blank => Ok(Cow::Borrowed("")),
            CellValue::Error(e) => Err(*e),
        }
    }

    /// Coerce to a logical
    pub fn to_logical(&self) -> CalcResult<bool> {
        match self {
            CellValue::Logical(b) => Ok(*b),
            CellValue::Number(n) => Ok(*n != 0.0),
            CellValue::Text(s) => parse_logical_text(s).ok_or(ErrorKind::Value),
            CellValue::Blank => Ok(false),
            CellValue::Error(e) => Err(*e),
        }
    }
}

/// Parse numeric text the way the en-US spreadsheet UI accepts it.
///
/// Accepts plain and decimal numbers, an exponent, comma thousands grouping
/// (`12,235.5`), a leading currency sign (`$12`, `-$12`, `$-12`), a trailing
/// percent (`12%` is `0.12`) and accounting negatives (`(12)`). Surrounding
/// whitespace is ignored.
pub fn parse_number_text(text: &str) -> Option<f64> {
    let (_, open, sign, _currency, late_sign, int, frac, exp, percent, close) = regex_captures!(
        r"^(\()?\s*([+-])?\s*(\$)?\s*([+-])?\s*(\d{1,3}(?:,\d{3})+|\d*)(?:\.(\d*))?(?:[eE]([+-]?\d+))?\s*(%)?\s*(\))?$",
        text.trim()
    )?;

    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if open.is_empty() != close.is_empty() {
        return None;
    }
    // One sign at most, and never together with accounting parentheses
    let signs = [sign, late_sign].iter().filter(|s| !s.is_empty()).count();
    if signs > 1 || (signs == 1 && !open.is_empty()) {
        return None;
    }
    let mut literal = if int.is_empty() {
        String::from("0")
    } else {
        int.replace(',', "")
    };
    if !frac.is_empty() {
        literal.push('.');
        literal.push_str(frac);
    }
    if !exp.is_empty() {
        literal.push('e');
        literal.push_str(exp);
    }

    let mut value: f64 = literal.parse().ok()?;
    if !percent.is_empty() {
        value /= 100.0;
    }
    if sign == "-" || late_sign == "-" || !open.is_empty() {
        value = -value;
    }
    value.is_finite().then_some(value)
}

/// Parse `TRUE`/`FALSE`, ignoring ASCII case
pub fn parse_logical_text(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if text.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// Format a number with the general number format.
///
/// At most 15 significant digits; decimal notation for magnitudes between
/// 1E-9 and 1E+15, scientific (`1.5E+20`) outside of it.
pub fn format_general(n: f64) -> String {
    if n == 0.0 || !n.is_finite() {
        return String::from("0");
    }

    let scientific = format!("{:.14e}", n);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return n.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-9..15).contains(&exponent) {
        let rounded: f64 = scientific.parse().unwrap_or(n);
        return rounded.to_string();
    }

    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{}{:02}", mantissa, sign, exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_number() {
        assert_eq!(CellValue::Number(2.5).to_number(), Ok(2.5));
        assert_eq!(CellValue::Logical(true).to_number(), Ok(1.0));
        assert_eq!(CellValue::Logical(false).to_number(), Ok(0.0));
        assert_eq!(CellValue::Blank.to_number(), Ok(0.0));
        assert_eq!(CellValue::text("12%").to_number(), Ok(0.12));
        assert_eq!(CellValue::text("abc").to_number(), Err(ErrorKind::Value));
        assert_eq!(CellValue::text("").to_number(), Err(ErrorKind::Value));
    }

    #[test]
    fn test_errors_are_never_coerced() {
        for kind in ErrorKind::ALL {
            let v = CellValue::Error(kind);
            assert_eq!(v.to_number(), Err(kind));
            assert_eq!(v.to_text(), Err(kind));
            assert_eq!(v.to_logical(), Err(kind));
        }
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(42.0).to_text().unwrap(), "42");
        assert_eq!(CellValue::Number(-0.25).to_text().unwrap(), "-0.25");
        assert_eq!(CellValue::Logical(true).to_text().unwrap(), "TRUE");
        assert_eq!(CellValue::Blank.to_text().unwrap(), "");
        assert_eq!(CellValue::text("x").to_text().unwrap(), "x");
    }

    #[test]
    fn test_to_logical() {
        assert_eq!(CellValue::Number(0.0).to_logical(), Ok(false));
        assert_eq!(CellValue::Number(-3.0).to_logical(), Ok(true));
        assert_eq!(CellValue::text("true").to_logical(), Ok(true));
        assert_eq!(CellValue::text("FaLsE").to_logical(), Ok(false));
        assert_eq!(CellValue::text("yes").to_logical(), Err(ErrorKind::Value));
        assert_eq!(CellValue::Blank.to_logical(), Ok(false));
    }

    #[test]
    fn test_parse_number_text_accepts() {
        assert_eq!(parse_number_text("123"), Some(123.0));
        assert_eq!(parse_number_text("  -4.5 "), Some(-4.5));
        assert_eq!(parse_number_text(".5"), Some(0.5));
        assert_eq!(parse_number_text("5."), Some(5.0));
        assert_eq!(parse_number_text("1e3"), Some(1000.0));
        assert_eq!(parse_number_text("12,235.5"), Some(12235.5));
        assert_eq!(parse_number_text("1,234,567"), Some(1234567.0));
        assert_eq!(parse_number_text("$12,235.5"), Some(12235.5));
        assert_eq!(parse_number_text("-$3"), Some(-3.0));
        assert_eq!(parse_number_text("$-3"), Some(-3.0));
        assert_eq!(parse_number_text("12%"), Some(0.12));
        assert_eq!(parse_number_text("(7)"), Some(-7.0));
    }

    #[test]
    fn test_parse_number_text_rejects() {
        assert_eq!(parse_number_text(""), None);
        assert_eq!(parse_number_text("asd"), None);
        assert_eq!(parse_number_text("$"), None);
        assert_eq!(parse_number_text("."), None);
        assert_eq!(parse_number_text("1,2"), None);
        assert_eq!(parse_number_text("12,34.5"), None);
        assert_eq!(parse_number_text("--1"), None);
        assert_eq!(parse_number_text("-$-1"), None);
        assert_eq!(parse_number_text("(1"), None);
        assert_eq!(parse_number_text("(-1)"), None);
        assert_eq!(parse_number_text("1e999"), None);
        assert_eq!(parse_number_text("TRUE"), None);
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(-0.0), "0");
        assert_eq!(format_general(42.0), "42");
        assert_eq!(format_general(0.1 + 0.2), "0.3");
        assert_eq!(format_general(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_general(123456789012345.0), "123456789012345");
        assert_eq!(format_general(1e15), "1E+15");
        assert_eq!(format_general(123456789012345678.0), "1.23456789012346E+17");
        assert_eq!(format_general(0.000000001), "0.000000001");
        assert_eq!(format_general(1.5e-10), "1.5E-10");
    }
}
