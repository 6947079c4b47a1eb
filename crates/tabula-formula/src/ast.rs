//! Formula Abstract Syntax Tree types
//!
//! [`FormulaExpr`] implements `Display`, printing formula text (without the
//! leading `=`) that parses back into an equivalent tree.

use std::fmt;
use tabula_core::{CellValue, Locator};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Number, text, logical or error literal. An omitted function argument
    /// (`IF(TRUE,,)`) is a blank literal.
    Literal(CellValue),
    /// Cell or range reference
    Reference(Locator),
    /// Defined name, resolved through the cell source at evaluation time
    Name(String),
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Function call; the name is stored upper-cased
    FunctionCall {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // Text
    Concat,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Prefix `-`
    Negate,
    /// Prefix `+`, returns its operand unchanged
    Plus,
    /// Postfix `%`
    Percent,
}

// Binding strength, loosest first
pub(crate) const COMPARISON: u8 = 1;
const CONCAT: u8 = 2;
const ADDITIVE: u8 = 3;
const MULTIPLICATIVE: u8 = 4;
const POWER: u8 = 5;
const PREFIX: u8 = 6;
const POSTFIX: u8 = 7;
const PRIMARY: u8 = 8;

impl BinaryOperator {
    /// The operator as written in formulas
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
            BinaryOperator::Concat => "&",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == COMPARISON
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterEqual => COMPARISON,
            BinaryOperator::Concat => CONCAT,
            BinaryOperator::Add | BinaryOperator::Subtract => ADDITIVE,
            BinaryOperator::Multiply | BinaryOperator::Divide => MULTIPLICATIVE,
            BinaryOperator::Power => POWER,
        }
    }
}

impl UnaryOperator {
    /// The operator as written in formulas
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Percent => "%",
        }
    }

    /// Whether the operator is written before its operand
    pub fn is_prefix(self) -> bool {
        !matches!(self, UnaryOperator::Percent)
    }
}

impl FormulaExpr {
    /// Shorthand for a number literal
    pub fn number(n: f64) -> Self {
        FormulaExpr::Literal(CellValue::Number(n))
    }

    /// Whether this node is syntactically a cell or range reference
    pub fn is_reference(&self) -> bool {
        matches!(self, FormulaExpr::Reference(_))
    }

    /// Number of nodes on the longest root-to-leaf path (a leaf is 1).
    ///
    /// Iterative, so it is safe on trees of any depth.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((expr, depth)) = stack.pop() {
            max = max.max(depth);
            match expr {
                FormulaExpr::UnaryOp { operand, .. } => stack.push((operand, depth + 1)),
                FormulaExpr::BinaryOp { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
                FormulaExpr::FunctionCall { args, .. } => {
                    stack.extend(args.iter().map(|arg| (arg, depth + 1)))
                }
                FormulaExpr::Literal(_) | FormulaExpr::Reference(_) | FormulaExpr::Name(_) => {}
            }
        }
        max
    }

    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
            FormulaExpr::UnaryOp { op, .. } if op.is_prefix() => PREFIX,
            FormulaExpr::UnaryOp { .. } => POSTFIX,
            _ => PRIMARY,
        }
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Literal(value) => write_literal(f, value),
            FormulaExpr::Reference(locator) => write!(f, "{}", locator),
            FormulaExpr::Name(name) => f.write_str(name),
            FormulaExpr::UnaryOp { op, operand } => {
                let wrap = operand.precedence() < self.precedence();
                if op.is_prefix() {
                    f.write_str(op.symbol())?;
                    write_operand(f, operand, wrap)
                } else {
                    write_operand(f, operand, wrap)?;
                    f.write_str(op.symbol())
                }
            }
            FormulaExpr::BinaryOp { op, left, right } => {
                // All binary operators associate to the left
                let prec = op.precedence();
                write_operand(f, left, left.precedence() < prec)?;
                f.write_str(op.symbol())?;
                write_operand(f, right, right.precedence() <= prec)
            }
            FormulaExpr::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &FormulaExpr, wrap: bool) -> fmt::Result {
    if wrap {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &CellValue) -> fmt::Result {
    match value {
        CellValue::Blank => Ok(()),
        CellValue::Number(n) => write!(f, "{}", n),
        CellValue::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
        CellValue::Logical(true) => f.write_str("TRUE"),
        CellValue::Logical(false) => f.write_str("FALSE"),
        CellValue::Error(e) => f.write_str(e.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{CellAddress, CellRange, ErrorKind};

    fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> FormulaExpr {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn unary(op: UnaryOperator, operand: FormulaExpr) -> FormulaExpr {
        FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    #[test]
    fn test_display_literals() {
        let call = FormulaExpr::FunctionCall {
            name: "IF".into(),
            args: vec![
                FormulaExpr::Literal(CellValue::Logical(true)),
                FormulaExpr::Literal(CellValue::Blank),
                FormulaExpr::Literal(CellValue::text("say \"hi\"")),
                FormulaExpr::Literal(CellValue::Error(ErrorKind::DivisionByZero)),
                FormulaExpr::number(2.5),
            ],
        };
        assert_eq!(call.to_string(), "IF(TRUE,,\"say \"\"hi\"\"\",#DIV/0!,2.5)");
    }

    #[test]
    fn test_display_minimal_parentheses() {
        use BinaryOperator::*;
        let one = || FormulaExpr::number(1.0);
        let two = || FormulaExpr::number(2.0);

        // (1+2)*1
        let e = binary(Multiply, binary(Add, one(), two()), one());
        assert_eq!(e.to_string(), "(1+2)*1");

        // 1+2*1
        let e = binary(Add, one(), binary(Multiply, two(), one()));
        assert_eq!(e.to_string(), "1+2*1");

        // 1-(2-1) keeps its grouping, (1-2)-1 does not need it
        let e = binary(Subtract, one(), binary(Subtract, two(), one()));
        assert_eq!(e.to_string(), "1-(2-1)");
        let e = binary(Subtract, binary(Subtract, one(), two()), one());
        assert_eq!(e.to_string(), "1-2-1");
    }

    #[test]
    fn test_display_unary() {
        let five = FormulaExpr::number(5.0);
        let neg = unary(UnaryOperator::Negate, five.clone());
        assert_eq!(neg.to_string(), "-5");
        assert_eq!(unary(UnaryOperator::Percent, neg.clone()).to_string(), "(-5)%");
        assert_eq!(
            unary(UnaryOperator::Negate, unary(UnaryOperator::Percent, five.clone())).to_string(),
            "-5%"
        );
        assert_eq!(
            binary(BinaryOperator::Power, neg, FormulaExpr::number(2.0)).to_string(),
            "-5^2"
        );
        assert_eq!(
            unary(
                UnaryOperator::Plus,
                binary(BinaryOperator::Add, five.clone(), five)
            )
            .to_string(),
            "+(5+5)"
        );
    }

    #[test]
    fn test_display_references() {
        let range = FormulaExpr::Reference(
            Locator::range(CellRange::parse("A1:B2").unwrap()).on_sheet("My Sheet"),
        );
        assert_eq!(range.to_string(), "'My Sheet'!A1:B2");
        let cell = FormulaExpr::Reference(Locator::cell(CellAddress::absolute(0, 2)));
        assert_eq!(cell.to_string(), "$C$1");
    }

    #[test]
    fn test_depth() {
        let leaf = FormulaExpr::number(1.0);
        assert_eq!(leaf.depth(), 1);
        let e = binary(
            BinaryOperator::Add,
            leaf.clone(),
            unary(UnaryOperator::Negate, leaf.clone()),
        );
        assert_eq!(e.depth(), 3);
        let call = FormulaExpr::FunctionCall {
            name: "NA".into(),
            args: vec![],
        };
        assert_eq!(call.depth(), 1);
    }
}
