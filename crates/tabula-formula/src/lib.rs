//! # tabula-formula
//!
//! Formula lexer, parser and evaluator for tabula.
//!
//! This crate provides:
//! - Tokenizing formula text ([`tokenize`])
//! - Parsing tokens into an AST ([`parse_formula`], [`parse`])
//! - Evaluating the AST against any [`CellSource`](tabula_core::CellSource)
//!   ([`evaluate`])
//! - A registry of built-in functions, centred on the information family
//!   (`ISBLANK`, `ISERR`, `ERROR.TYPE`, ...)
//!
//! Parsing reports malformed text as a [`FormulaError`]. Evaluation never
//! fails: spreadsheet errors such as `#DIV/0!` are ordinary values.
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellValue, Workbook};
//! use tabula_formula::{evaluate, parse_formula, EvaluationContext};
//!
//! let mut workbook = Workbook::new();
//! workbook.worksheet_mut(0).unwrap().set_cell_value("A1", 7.0).unwrap();
//!
//! let ast = parse_formula("=ISODD(A1)").unwrap();
//! let result = evaluate(&ast, &EvaluationContext::new(&workbook));
//! assert_eq!(result, CellValue::Logical(true));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult, LexError, ParseError};
pub use evaluator::{builtin_registry, compare_values, evaluate, Argument, EvaluationContext};
pub use functions::{ArgMode, FunctionDef, FunctionImpl, FunctionRegistry};
pub use lexer::{tokenize, Operator, Punctuation, Span, Token, TokenKind};
pub use parser::{
    parse, parse_formula, parse_formula_with, parse_with, ParserOptions, DEFAULT_MAX_DEPTH,
    NESTING_COST,
};
