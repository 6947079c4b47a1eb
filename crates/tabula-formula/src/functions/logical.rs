//! Logical functions

use super::arg_value;
use crate::evaluator::{Argument, EvaluationContext};
use tabula_core::{CalcResult, CellValue, ErrorKind};

/// IF(condition, value_if_true, [value_if_false])
///
/// Only the chosen branch is evaluated. Without a third argument a false
/// condition gives `FALSE`.
pub fn fn_if(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let condition = arg_value(args, 0, ctx)?.to_logical()?;

    if condition {
        arg_value(args, 1, ctx)
    } else if args.len() > 2 {
        arg_value(args, 2, ctx)
    } else {
        Ok(CellValue::Logical(false))
    }
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    match arg_value(args, 0, ctx)? {
        CellValue::Error(_) => arg_value(args, 1, ctx),
        value => Ok(value),
    }
}

/// IFNA(value, value_if_na)
pub fn fn_ifna(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    match arg_value(args, 0, ctx)? {
        CellValue::Error(ErrorKind::NotAvailable) => arg_value(args, 1, ctx),
        value => Ok(value),
    }
}

/// NOT(logical)
pub fn fn_not(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let b = arg_value(args, 0, ctx)?.to_logical()?;
    Ok(CellValue::Logical(!b))
}

/// TRUE()
pub fn fn_true(_args: &[Argument<'_>], _ctx: &EvaluationContext<'_>) -> CalcResult {
    Ok(CellValue::Logical(true))
}

/// FALSE()
pub fn fn_false(_args: &[Argument<'_>], _ctx: &EvaluationContext<'_>) -> CalcResult {
    Ok(CellValue::Logical(false))
}
