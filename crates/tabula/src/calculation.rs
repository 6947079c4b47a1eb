//! One-shot formula calculation
//!
//! Parses and evaluates formula text against a workbook or any other cell
//! source in a single call.
//!
//! # Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", "ten").unwrap();
//!
//! assert_eq!(workbook.calculate("=ISNUMBER(A1)").unwrap(), CellValue::Logical(true));
//! assert_eq!(workbook.calculate("=A1*2").unwrap(), CellValue::Number(20.0));
//! assert!(workbook.calculate("=A1+").is_err());
//! ```

use crate::{
    builtin_registry, evaluate, parse_formula_with, CellSource, CellValue, EvaluationContext,
    FormulaResult, FunctionRegistry, ParserOptions, DEFAULT_MAX_DEPTH,
};

/// Options for formula calculation
#[derive(Debug, Clone, Copy)]
pub struct CalculationOptions<'r> {
    /// Parser depth budget, see [`ParserOptions::max_depth`] (default: 512)
    pub max_depth: usize,
    /// Functions callable by name (default: the built-in registry)
    pub registry: &'r FunctionRegistry,
}

impl Default for CalculationOptions<'static> {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            registry: builtin_registry(),
        }
    }
}

/// Parse `formula` and evaluate it against `source`.
///
/// Only malformed text is an `Err`; spreadsheet errors such as `#DIV/0!`
/// come back as `Ok(CellValue::Error(..))`.
pub fn evaluate_formula<S: CellSource + ?Sized>(
    formula: &str,
    source: &S,
) -> FormulaResult<CellValue> {
    evaluate_formula_with(formula, source, &CalculationOptions::default())
}

/// [`evaluate_formula`] with explicit options
pub fn evaluate_formula_with<S: CellSource + ?Sized>(
    formula: &str,
    source: &S,
    options: &CalculationOptions<'_>,
) -> FormulaResult<CellValue> {
    let parser_options = ParserOptions {
        max_depth: options.max_depth,
    };
    let ast = parse_formula_with(formula, &parser_options)?;

    let source: &dyn CellSource = &source;
    let ctx = EvaluationContext::with_registry(source, options.registry);
    let result = evaluate(&ast, &ctx);
    log::trace!("{} = {:?}", formula, result);
    Ok(result)
}

/// Extension trait for evaluating formulas directly on a cell source
pub trait WorkbookCalculationExt {
    /// Parse and evaluate a formula against this source
    fn calculate(&self, formula: &str) -> FormulaResult<CellValue>;

    /// Parse and evaluate a formula with explicit options
    fn calculate_with(
        &self,
        formula: &str,
        options: &CalculationOptions<'_>,
    ) -> FormulaResult<CellValue>;
}

impl<T: CellSource> WorkbookCalculationExt for T {
    fn calculate(&self, formula: &str) -> FormulaResult<CellValue> {
        evaluate_formula(formula, self)
    }

    fn calculate_with(
        &self,
        formula: &str,
        options: &CalculationOptions<'_>,
    ) -> FormulaResult<CellValue> {
        evaluate_formula_with(formula, self, options)
    }
}
