//! Date/time functions
//!
//! Dates are serial-day numbers in the 1900 system (see
//! [`tabula_core::serial`]), including the phantom 1900-02-29 at serial 60.

use super::arg_value;
use crate::evaluator::{Argument, EvaluationContext};
use chrono::{Local, NaiveDate};
use tabula_core::{serial, CalcResult, CellValue, ErrorKind};

/// Number argument truncated toward zero
fn int_arg(args: &[Argument<'_>], index: usize, ctx: &EvaluationContext<'_>) -> CalcResult<i64> {
    let n = arg_value(args, index, ctx)?.to_number()?;
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&n) {
        return Err(ErrorKind::Number);
    }
    Ok(n.trunc() as i64)
}

fn serial_arg(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult<(i32, u32, u32)> {
    let n = arg_value(args, 0, ctx)?.to_number()?;
    serial::to_ymd(n).ok_or(ErrorKind::Number)
}

/// TODAY()
pub fn fn_today(_args: &[Argument<'_>], _ctx: &EvaluationContext<'_>) -> CalcResult {
    let today = Local::now().date_naive();
    serial::from_date(today)
        .map(CellValue::Number)
        .ok_or(ErrorKind::Number)
}

/// NOW()
pub fn fn_now(_args: &[Argument<'_>], _ctx: &EvaluationContext<'_>) -> CalcResult {
    let now = Local::now().naive_local();
    serial::from_datetime(now)
        .map(CellValue::Number)
        .ok_or(ErrorKind::Number)
}

/// DATE(year, month, day)
///
/// Years below 1900 are offsets from 1900. Months and days outside their
/// usual range roll over into neighbouring months and years.
pub fn fn_date(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let mut year = int_arg(args, 0, ctx)?;
    let month = int_arg(args, 1, ctx)?;
    let day = int_arg(args, 2, ctx)?;

    if (0..1900).contains(&year) {
        year += 1900;
    }
    if !(1900..=9999).contains(&year) {
        return Err(ErrorKind::Number);
    }

    let months = year * 12 + month - 1;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    if !(1900..=9999).contains(&year) {
        return Err(ErrorKind::Number);
    }

    let first = NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
        .and_then(serial::from_date)
        .ok_or(ErrorKind::Number)?;
    let result = first + (day - 1) as f64;
    if !(0.0..=serial::MAX_SERIAL).contains(&result) {
        return Err(ErrorKind::Number);
    }
    Ok(CellValue::Number(result))
}

/// YEAR(serial_number)
pub fn fn_year(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let (year, _, _) = serial_arg(args, ctx)?;
    Ok(CellValue::Number(year as f64))
}

/// MONTH(serial_number)
pub fn fn_month(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let (_, month, _) = serial_arg(args, ctx)?;
    Ok(CellValue::Number(month as f64))
}

/// DAY(serial_number)
pub fn fn_day(args: &[Argument<'_>], ctx: &EvaluationContext<'_>) -> CalcResult {
    let (_, _, day) = serial_arg(args, ctx)?;
    Ok(CellValue::Number(day as f64))
}
