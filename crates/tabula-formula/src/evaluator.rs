//! Formula evaluator
//!
//! Evaluates formula ASTs against a [`CellSource`]. Evaluation is total:
//! every failure is an in-band [`CellValue::Error`], never a Rust error or
//! a panic. The tree is only borrowed, so one parsed formula can be
//! evaluated any number of times.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::functions::{ArgMode, FunctionRegistry};
use std::cmp::Ordering;
use std::sync::OnceLock;
use tabula_core::{CalcResult, CellSource, CellValue, ErrorKind, Locator};

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The registry of built-in functions shared by every default context
pub fn builtin_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Context for formula evaluation
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Where cell values come from
    source: &'a dyn CellSource,
    /// Functions callable by name
    registry: &'a FunctionRegistry,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context over `source` with the built-in functions
    pub fn new(source: &'a dyn CellSource) -> Self {
        Self {
            source,
            registry: builtin_registry(),
        }
    }

    /// Create a context with a caller-built registry
    pub fn with_registry(source: &'a dyn CellSource, registry: &'a FunctionRegistry) -> Self {
        Self { source, registry }
    }

    /// The cell source
    pub fn source(&self) -> &'a dyn CellSource {
        self.source
    }

    /// The function registry
    pub fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    /// Evaluate an expression in this context
    pub fn evaluate(&self, expr: &FormulaExpr) -> CellValue {
        evaluate(expr, self)
    }

    /// Value of a locator; a range reduces to its top-left cell
    pub fn lookup(&self, locator: &Locator) -> CellValue {
        self.source.lookup(&locator.top_left_cell())
    }

    /// The locator an expression refers to without evaluating it: a
    /// reference node, or a defined name the source knows
    pub fn resolve_reference(&self, expr: &FormulaExpr) -> Option<Locator> {
        match expr {
            FormulaExpr::Reference(locator) => Some(locator.clone()),
            FormulaExpr::Name(name) => self.source.defined_name(name),
            _ => None,
        }
    }
}

/// A function argument as the implementation receives it
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<'e> {
    /// Already evaluated ([`ArgMode::Value`])
    Value(CellValue),
    /// Not evaluated ([`ArgMode::Reference`])
    Expr(&'e FormulaExpr),
}

impl<'e> Argument<'e> {
    /// The argument's value; a lazy argument is evaluated now
    pub fn value(&self, ctx: &EvaluationContext<'_>) -> CellValue {
        match self {
            Argument::Value(value) => value.clone(),
            Argument::Expr(expr) => evaluate(expr, ctx),
        }
    }

    /// The unevaluated expression, for a lazy argument
    pub fn expr(&self) -> Option<&'e FormulaExpr> {
        match self {
            Argument::Expr(expr) => Some(expr),
            Argument::Value(_) => None,
        }
    }
}

/// Evaluate a formula expression
///
/// # Example
/// ```rust
/// use tabula_core::{CellValue, EmptySource};
/// use tabula_formula::{evaluate, parse_formula, EvaluationContext};
///
/// let ast = parse_formula("=ISBLANK(A1)").unwrap();
/// let ctx = EvaluationContext::new(&EmptySource);
/// assert_eq!(evaluate(&ast, &ctx), CellValue::Logical(true));
/// ```
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext<'_>) -> CellValue {
    match expr {
        FormulaExpr::Literal(value) => value.clone(),

        FormulaExpr::Reference(locator) => ctx.lookup(locator),

        FormulaExpr::Name(name) => match ctx.source.defined_name(name) {
            Some(locator) => ctx.lookup(&locator),
            None => CellValue::Error(ErrorKind::Name),
        },

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate(operand, ctx);
            evaluate_unary_op(*op, value).unwrap_or_else(CellValue::Error)
        }

        FormulaExpr::BinaryOp { op, left, right } => {
            let left = evaluate(left, ctx);
            let right = evaluate(right, ctx);
            evaluate_binary_op(*op, &left, &right).unwrap_or_else(CellValue::Error)
        }

        FormulaExpr::FunctionCall { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: UnaryOperator, value: CellValue) -> CalcResult {
    match op {
        UnaryOperator::Plus => Ok(value),
        UnaryOperator::Negate => Ok(CellValue::Number(-value.to_number()?)),
        UnaryOperator::Percent => Ok(CellValue::Number(value.to_number()? / 100.0)),
    }
}

/// Evaluate a binary operation on already evaluated operands
fn evaluate_binary_op(op: BinaryOperator, left: &CellValue, right: &CellValue) -> CalcResult {
    // Propagate errors, left first
    if let CellValue::Error(e) = left {
        return Err(*e);
    }
    if let CellValue::Error(e) = right {
        return Err(*e);
    }

    if op.is_comparison() {
        let ordering = compare_values(left, right);
        let result = match op {
            BinaryOperator::Equal => ordering == Ordering::Equal,
            BinaryOperator::NotEqual => ordering != Ordering::Equal,
            BinaryOperator::LessThan => ordering == Ordering::Less,
            BinaryOperator::LessEqual => ordering != Ordering::Greater,
            BinaryOperator::GreaterThan => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        return Ok(CellValue::Logical(result));
    }

    if op == BinaryOperator::Concat {
        let mut text = left.to_text()?.into_owned();
        text.push_str(&right.to_text()?);
        return Ok(CellValue::Text(text));
    }

    let l = left.to_number()?;
    let r = right.to_number()?;
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(ErrorKind::DivisionByZero);
            }
            l / r
        }
        _ => power(l, r)?,
    };

    finite(result)
}

fn power(base: f64, exponent: f64) -> CalcResult<f64> {
    if base == 0.0 {
        if exponent == 0.0 {
            return Err(ErrorKind::Number);
        }
        if exponent < 0.0 {
            return Err(ErrorKind::DivisionByZero);
        }
    }
    Ok(base.powf(exponent))
}

/// Overflow and undefined results are `#NUM!`
fn finite(n: f64) -> CalcResult {
    if n.is_finite() {
        Ok(CellValue::Number(n))
    } else {
        Err(ErrorKind::Number)
    }
}

/// Compare two non-error values (spreadsheet-style comparison).
///
/// Blank takes the other side's kind (`0`, `""` or `FALSE`). Text compares
/// case-insensitively. Different kinds order Number < Text < Logical.
pub fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    fn rank(value: &CellValue) -> u8 {
        match value {
            CellValue::Blank | CellValue::Number(_) => 0,
            CellValue::Text(_) => 1,
            CellValue::Logical(_) => 2,
            CellValue::Error(_) => 3,
        }
    }

    match (left, right) {
        (CellValue::Blank, CellValue::Blank) => Ordering::Equal,
        (CellValue::Blank, other) => compare_values(&blank_as(other), other),
        (other, CellValue::Blank) => compare_values(other, &blank_as(other)),

        (CellValue::Number(l), CellValue::Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        (CellValue::Text(l), CellValue::Text(r)) => l.to_lowercase().cmp(&r.to_lowercase()),
        (CellValue::Logical(l), CellValue::Logical(r)) => l.cmp(r),
        (CellValue::Error(l), CellValue::Error(r)) => l.cmp(r),

        _ => rank(left).cmp(&rank(right)),
    }
}

/// What a blank cell means next to `other`
fn blank_as(other: &CellValue) -> CellValue {
    match other {
        CellValue::Text(_) => CellValue::Text(String::new()),
        CellValue::Logical(_) => CellValue::Logical(false),
        _ => CellValue::Number(0.0),
    }
}

/// Evaluate a function call
fn evaluate_function(name: &str, args: &[FormulaExpr], ctx: &EvaluationContext<'_>) -> CellValue {
    let Some(func) = ctx.registry.get(name) else {
        log::debug!("unknown function {}", name);
        return CellValue::Error(ErrorKind::Name);
    };

    // Check argument count
    if !func.accepts(args.len()) {
        log::debug!(
            "{} called with {} argument(s), expected {}..{}",
            func.name,
            args.len(),
            func.min_args,
            func.max_args.map_or_else(|| "".to_string(), |max| max.to_string()),
        );
        return CellValue::Error(ErrorKind::Value);
    }

    log::trace!("calling {} with {} argument(s)", func.name, args.len());

    // Evaluate arguments
    let mut call_args = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        match func.arg_mode(index) {
            ArgMode::Reference => call_args.push(Argument::Expr(arg)),
            ArgMode::Value => {
                let value = evaluate(arg, ctx);
                if let CellValue::Error(e) = value {
                    if !func.error_transparent {
                        return CellValue::Error(e);
                    }
                }
                call_args.push(Argument::Value(value));
            }
        }
    }

    // Call the function
    (func.implementation)(&call_args, ctx).unwrap_or_else(CellValue::Error)
}
