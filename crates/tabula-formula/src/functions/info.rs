//! Information functions
//!
//! Predicates and conversions over a single value. `ISBLANK` and `ISREF` receive
//! their argument unevaluated; the rest are registered error-transparent
//! except the parity checks and `T`.

use super::arg_value;
use crate::evaluator::{Argument, EvaluationContext};
use tabula_core::{parse_number_text, CalcResult, CellValue, ErrorKind};

fn logical(b: bool) -> CalcResult {
    Ok(CellValue::Logical(b))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    logical(arg_value(args, 0, ctx)?.is_blank())
}

/// ISREF(value)
///
/// True for a cell or range reference and for a defined name that resolves
/// to one. The argument is never evaluated.
pub fn fn_isref(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let is_ref = args
        .first()
        .and_then(Argument::expr)
        .and_then(|expr| ctx.resolve_reference(expr))
        .is_some();
    logical(is_ref)
}

/// ISERROR(value)
pub fn fn_iserror(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    logical(arg_value(args, 0, ctx)?.is_error())
}

/// ISERR(value), any error except `#N/A`
pub fn fn_iserr(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let value = arg_value(args, 0, ctx)?;
    logical(matches!(value.error(), Some(e) if e != ErrorKind::NotAvailable))
}

/// ISNA(value)
pub fn fn_isna(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let value = arg_value(args, 0, ctx)?;
    logical(value.error() == Some(ErrorKind::NotAvailable))
}

/// ISLOGICAL(value)
///
/// Registered error-transparent: an error argument is FALSE, not propagated.
pub fn fn_islogical(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let value = arg_value(args, 0, ctx)?;
    logical(matches!(value, CellValue::Logical(_)))
}

/// ISNUMBER(value)
///
/// Text counts when it reads as a number (`"12,235.5"`, `"$5"`, `"12%"`).
/// Registered error-transparent: an error argument is FALSE, not propagated.
pub fn fn_isnumber(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let is_number = match arg_value(args, 0, ctx)? {
        CellValue::Number(_) => true,
        CellValue::Text(s) => parse_number_text(&s).is_some(),
        _ => false,
    };
    logical(is_number)
}

/// ISTEXT(value)
///
/// Registered error-transparent: an error argument is FALSE, not propagated.
pub fn fn_istext(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let value = arg_value(args, 0, ctx)?;
    logical(matches!(value, CellValue::Text(_)))
}

/// ISNONTEXT(value)
///
/// Registered error-transparent: an error argument is TRUE, not propagated.
pub fn fn_isnontext(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let value = arg_value(args, 0, ctx)?;
    logical(!matches!(value, CellValue::Text(_)))
}

/// Whether the integer part of the argument is even
fn is_even(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult<bool> {
    let n = arg_value(args, 0, ctx)?.to_number()?;
    Ok(n.trunc() % 2.0 == 0.0)
}

/// ISEVEN(number)
pub fn fn_iseven(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    logical(is_even(args, ctx)?)
}

/// ISODD(number)
pub fn fn_isodd(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    logical(!is_even(args, ctx)?)
}

/// N(value)
pub fn fn_n(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    match arg_value(args, 0, ctx)? {
        CellValue::Number(n) => Ok(CellValue::Number(n)),
        CellValue::Logical(b) => Ok(CellValue::Number(if b { 1.0 } else { 0.0 })),
        CellValue::Blank | CellValue::Text(_) => Ok(CellValue::Number(0.0)),
        CellValue::Error(e) => Err(e),
    }
}

/// ERROR.TYPE(value)
pub fn fn_error_type(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    match arg_value(args, 0, ctx)?.error() {
        Some(e) => Ok(CellValue::Number(e.ordinal() as f64)),
        None => Err(ErrorKind::NotAvailable),
    }
}

/// TYPE(value)
pub fn fn_type(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let code = match arg_value(args, 0, ctx)? {
        CellValue::Blank | CellValue::Number(_) => 1.0,
        CellValue::Text(_) => 2.0,
        CellValue::Logical(_) => 4.0,
        CellValue::Error(_) => 16.0,
    };
    Ok(CellValue::Number(code))
}

/// T(value)
pub fn fn_t(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    match arg_value(args, 0, ctx)? {
        CellValue::Text(s) => Ok(CellValue::Text(s)),
        _ => Ok(CellValue::Text(String::new())),
    }
}

/// NA()
pub fn fn_na(_args: &[Argument<'_>], _ctx: &EvaluationContext<'_>) -> CalcResult {
    Err(ErrorKind::NotAvailable)
}
