//! Reference functions
//!
//! These look at the shape of their argument, so it arrives unevaluated.

use super::arg_value;
use crate::evaluator::{Argument, EvaluationContext};
use tabula_core::{CalcResult, CellRange, CellValue, ErrorKind};

/// Area of a reference argument; a plain value counts as one cell
fn area(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult<Option<CellRange>> {
    let expr = args.first().and_then(Argument::expr);
    if let Some(locator) = expr.and_then(|expr| ctx.resolve_reference(expr)) {
        return Ok(Some(locator.area()));
    }
    match arg_value(args, 0, ctx)? {
        CellValue::Error(e) => Err(e),
        _ => Ok(None),
    }
}

/// ROWS(reference)
pub fn fn_rows(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let rows = area(args, ctx)?.map_or(1, |range| range.row_count());
    Ok(CellValue::Number(rows as f64))
}

/// COLUMNS(reference)
pub fn fn_columns(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let cols = area(args, ctx)?.map_or(1, |range| range.col_count() as u32);
    Ok(CellValue::Number(cols as f64))
}

/// COUNTBLANK(range)
///
/// Counts cells that are blank or hold empty text. The source counts them,
/// so a whole-sheet range costs no more than the cells actually stored.
pub fn fn_countblank(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let locator = args
        .first()
        .and_then(Argument::expr)
        .and_then(|expr| ctx.resolve_reference(expr))
        .ok_or(ErrorKind::Value)?;

    let count = ctx.source().count_empty(&locator)?;
    Ok(CellValue::Number(count as f64))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, EvaluationContext};
    use crate::parser::parse_formula;
    use tabula_core::{CellValue, ErrorKind, Workbook};

    fn eval(formula: &str) -> CellValue {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", 1.0).unwrap();
        sheet.set_cell_value("A2", "").unwrap();
        sheet.set_cell_value("B2", "x").unwrap();
        let ast = parse_formula(formula).unwrap();
        evaluate(&ast, &EvaluationContext::new(&wb))
    }

    #[test]
    fn test_rows_columns() {
        assert_eq!(eval("=ROWS(A1:C5)"), CellValue::Number(5.0));
        assert_eq!(eval("=COLUMNS(A1:C5)"), CellValue::Number(3.0));
        assert_eq!(eval("=ROWS(B7)"), CellValue::Number(1.0));
        assert_eq!(eval("=COLUMNS(42)"), CellValue::Number(1.0));
        assert_eq!(eval("=ROWS(1/0)"), CellValue::Error(ErrorKind::DivisionByZero));
    }

    #[test]
    fn test_countblank() {
        // A1 holds a number, B2 text, A2 empty text
        assert_eq!(eval("=COUNTBLANK(A1:B3)"), CellValue::Number(4.0));
        assert_eq!(eval("=COUNTBLANK(A2)"), CellValue::Number(1.0));
        assert_eq!(eval("=COUNTBLANK(5)"), CellValue::Error(ErrorKind::Value));
        assert_eq!(
            eval("=COUNTBLANK(Missing!A1:B2)"),
            CellValue::Error(ErrorKind::Reference)
        );
    }

    #[test]
    fn test_countblank_whole_sheet() {
        // 3 of the 2^34 cells are non-empty
        assert_eq!(
            eval("=COUNTBLANK(A1:XFD1048576)"),
            CellValue::Number(17_179_869_181.0)
        );
        assert_eq!(
            eval("=COUNTBLANK(A1:A1048576)"),
            CellValue::Number(1_048_575.0)
        );
    }
}
