//! Built-in functions
//!
//! Every function is a [`FunctionDef`] record in a [`FunctionRegistry`].
//! The record tells the evaluator how to call the function: its arity, how
//! each argument is passed and whether error arguments reach the function
//! or short-circuit the call.

pub mod date;
pub mod info;
pub mod logical;
pub mod reference;

use crate::evaluator::{Argument, EvaluationContext};
use ahash::AHashMap;
use std::fmt;
use tabula_core::{CalcResult, CellValue, ErrorKind};

/// Function implementation signature
///
/// A returned `Err(kind)` becomes the in-band `CellValue::Error(kind)`, so
/// implementations can use `?` on coercions.
pub type FunctionImpl = fn(&[Argument<'_>], &EvaluationContext<'_>) -> CalcResult;

/// How the evaluator passes an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMode {
    /// Evaluated to a value before the call
    Value,
    /// Passed as the unevaluated expression; the function decides whether
    /// and how to evaluate it
    Reference,
}

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Argument modes by position; the last one repeats for further
    /// arguments. Empty means every argument is [`ArgMode::Value`].
    pub params: &'static [ArgMode],
    /// Error values in `Value` arguments are passed to the implementation
    /// instead of becoming the call's result
    pub error_transparent: bool,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (recalculates every time)
    pub volatile: bool,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("params", &self.params)
            .field("error_transparent", &self.error_transparent)
            .field("volatile", &self.volatile)
            .finish_non_exhaustive()
    }
}

impl FunctionDef {
    /// Mode of the argument at `index`
    pub fn arg_mode(&self, index: usize) -> ArgMode {
        self.params
            .get(index)
            .or(self.params.last())
            .copied()
            .unwrap_or(ArgMode::Value)
    }

    /// Whether `count` arguments is acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

const VALUE: &[ArgMode] = &[ArgMode::Value];
const REFERENCE: &[ArgMode] = &[ArgMode::Reference];
/// First argument evaluated, the rest left to the function
const VALUE_THEN_LAZY: &[ArgMode] = &[ArgMode::Value, ArgMode::Reference];

/// Function registry
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_info_functions();
        registry.register_logical_functions();
        registry.register_date_functions();
        registry.register_reference_functions();

        registry
    }

    /// Create a registry with no functions at all
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function, replacing any function of the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Whether the named function must be recalculated on every pass
    pub fn is_volatile(&self, name: &str) -> bool {
        self.get(name).map_or(false, |def| def.volatile)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Shorthand for the common one-argument predicate shape
    fn register_unary(
        &mut self,
        name: &'static str,
        mode: &'static [ArgMode],
        transparent: bool,
        implementation: FunctionImpl,
    ) {
        self.register(FunctionDef {
            name,
            min_args: 1,
            max_args: Some(1),
            params: mode,
            error_transparent: transparent,
            implementation,
            volatile: false,
        });
    }

    fn register_info_functions(&mut self) {
        // Reference-aware
        self.register_unary("ISBLANK", REFERENCE, false, info::fn_isblank);
        self.register_unary("ISREF", REFERENCE, false, info::fn_isref);

        // Error-transparent predicates. The type checks are too, so
        // ISNUMBER(#N/A) is FALSE rather than #N/A.
        self.register_unary("ISERROR", VALUE, true, info::fn_iserror);
        self.register_unary("ISERR", VALUE, true, info::fn_iserr);
        self.register_unary("ISNA", VALUE, true, info::fn_isna);
        self.register_unary("ISLOGICAL", VALUE, true, info::fn_islogical);
        self.register_unary("ISNUMBER", VALUE, true, info::fn_isnumber);
        self.register_unary("ISTEXT", VALUE, true, info::fn_istext);
        self.register_unary("ISNONTEXT", VALUE, true, info::fn_isnontext);

        // Numeric parity propagates errors
        self.register_unary("ISEVEN", VALUE, false, info::fn_iseven);
        self.register_unary("ISODD", VALUE, false, info::fn_isodd);

        self.register_unary("N", VALUE, true, info::fn_n);
        self.register_unary("ERROR.TYPE", VALUE, true, info::fn_error_type);
        self.register_unary("TYPE", VALUE, true, info::fn_type);
        self.register_unary("T", VALUE, false, info::fn_t);

        // NA
        self.register(FunctionDef {
            name: "NA",
            min_args: 0,
            max_args: Some(0),
            params: VALUE,
            error_transparent: false,
            implementation: info::fn_na,
            volatile: false,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF: the branch not taken is never evaluated
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            params: VALUE_THEN_LAZY,
            error_transparent: false,
            implementation: logical::fn_if,
            volatile: false,
        });

        // IFERROR
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            params: VALUE_THEN_LAZY,
            error_transparent: true,
            implementation: logical::fn_iferror,
            volatile: false,
        });

        // IFNA
        self.register(FunctionDef {
            name: "IFNA",
            min_args: 2,
            max_args: Some(2),
            params: VALUE_THEN_LAZY,
            error_transparent: true,
            implementation: logical::fn_ifna,
            volatile: false,
        });

        self.register_unary("NOT", VALUE, false, logical::fn_not);

        // TRUE / FALSE
        self.register(FunctionDef {
            name: "TRUE",
            min_args: 0,
            max_args: Some(0),
            params: VALUE,
            error_transparent: false,
            implementation: logical::fn_true,
            volatile: false,
        });
        self.register(FunctionDef {
            name: "FALSE",
            min_args: 0,
            max_args: Some(0),
            params: VALUE,
            error_transparent: false,
            implementation: logical::fn_false,
            volatile: false,
        });
    }

    fn register_date_functions(&mut self) {
        // TODAY (volatile)
        self.register(FunctionDef {
            name: "TODAY",
            min_args: 0,
            max_args: Some(0),
            params: VALUE,
            error_transparent: false,
            implementation: date::fn_today,
            volatile: true,
        });

        // NOW (volatile)
        self.register(FunctionDef {
            name: "NOW",
            min_args: 0,
            max_args: Some(0),
            params: VALUE,
            error_transparent: false,
            implementation: date::fn_now,
            volatile: true,
        });

        // DATE
        self.register(FunctionDef {
            name: "DATE",
            min_args: 3,
            max_args: Some(3),
            params: VALUE,
            error_transparent: false,
            implementation: date::fn_date,
            volatile: false,
        });

        self.register_unary("YEAR", VALUE, false, date::fn_year);
        self.register_unary("MONTH", VALUE, false, date::fn_month);
        self.register_unary("DAY", VALUE, false, date::fn_day);
    }

    fn register_reference_functions(&mut self) {
        self.register_unary("ROWS", REFERENCE, false, reference::fn_rows);
        self.register_unary("COLUMNS", REFERENCE, false, reference::fn_columns);
        self.register_unary("COUNTBLANK", REFERENCE, false, reference::fn_countblank);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of the argument at `index`, evaluating a lazy argument.
///
/// Arity is checked before a function runs, so a missing argument here is a
/// registry entry that disagrees with its implementation; it reads as
/// `#VALUE!` rather than a panic.
pub(crate) fn arg_value(
    args: &[Argument<'_>],
    index: usize,
    ctx: &EvaluationContext<'_>,
) -> CalcResult<CellValue> {
    args.get(index)
        .map(|arg| arg.value(ctx))
        .ok_or(ErrorKind::Value)
}
