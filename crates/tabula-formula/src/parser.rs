//! Formula parser
//!
//! A recursive descent parser over the lexer's tokens. Binary operators are
//! parsed by precedence climbing; the levels are (lowest to highest):
//! 1. Comparison: =, <>, <, <=, >, >=
//! 2. Concatenation: &
//! 3. Addition/Subtraction: +, -
//! 4. Multiplication/Division: *, /
//! 5. Exponentiation: ^ (left associative)
//! 6. Prefix: -, +
//! 7. Postfix: %
//! 8. Primary: literals, references, ranges, function calls, parentheses
//!
//! Prefix minus binds tighter than `^`, so `-2^2` is `4`. Function names are
//! not checked here; an unknown function is `#NAME?` when evaluated.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator, COMPARISON};
use crate::error::{FormulaResult, ParseError};
use crate::lexer::{tokenize, Operator, Punctuation, Span, Token, TokenKind};
use tabula_core::{CellAddress, CellRange, CellValue, Locator};

/// Default nesting limit, see [`ParserOptions::max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Depth units charged for each parenthesised group or function argument
pub const NESTING_COST: usize = 4;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Depth budget for one formula.
    ///
    /// Each operator costs one unit and each parenthesised group or function
    /// argument costs [`NESTING_COST`]. The default allows over 100 nested
    /// calls or a chain of 500 operators. Evaluation and printing walk the
    /// tree recursively, so this bounds their stack use as well as the
    /// parser's own.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse a formula string into an AST
///
/// The leading `=` is optional.
///
/// # Example
/// ```rust
/// use tabula_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=ISBLANK(A1)").unwrap();
/// let ast = parse_formula("IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    parse_formula_with(formula, &ParserOptions::default())
}

/// Parse a formula string with explicit options
pub fn parse_formula_with(formula: &str, options: &ParserOptions) -> FormulaResult<FormulaExpr> {
    let tokens = tokenize(formula)?;
    Ok(parse_with(&tokens, options)?)
}

/// Build an expression tree from tokens produced by [`tokenize`]
pub fn parse(tokens: &[Token]) -> Result<FormulaExpr, ParseError> {
    parse_with(tokens, &ParserOptions::default())
}

/// [`parse`] with explicit options
pub fn parse_with(tokens: &[Token], options: &ParserOptions) -> Result<FormulaExpr, ParseError> {
    let mut parser = FormulaParser::new(tokens, options.max_depth);

    parser.eat_operator(Operator::Equal);
    if parser.at_end() {
        return Err(ParseError::EmptyFormula);
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    match parser.current().kind {
        TokenKind::EndOfInput => Ok(expr),
        TokenKind::Punctuation(Punctuation::RightParen) => Err(ParseError::UnmatchedParenthesis {
            position: parser.position(),
        }),
        _ => Err(parser.unexpected()),
    }
}

type ParseResult = Result<FormulaExpr, ParseError>;

/// Formula parser
struct FormulaParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Stands in for a missing trailing EndOfInput
    end: Token,
    depth: usize,
    max_depth: usize,
}

impl<'t> FormulaParser<'t> {
    fn new(tokens: &'t [Token], max_depth: usize) -> Self {
        let offset = tokens.last().map_or(0, |t| t.span.end);
        Self {
            tokens,
            pos: 0,
            end: Token {
                kind: TokenKind::EndOfInput,
                span: Span {
                    start: offset,
                    end: offset,
                },
            },
            depth: 0,
            max_depth,
        }
    }

    // === Token helpers ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.end)
    }

    fn position(&self) -> usize {
        self.current().span.start
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::EndOfInput
    }

    fn current_operator(&self) -> Option<Operator> {
        match self.current().kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    fn is_punct(&self, punct: Punctuation) -> bool {
        self.current().kind == TokenKind::Punctuation(punct)
    }

    fn eat_operator(&mut self, op: Operator) -> bool {
        if self.current_operator() == Some(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, punct: Punctuation) -> bool {
        if self.is_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current().kind.to_string(),
            position: self.position(),
        }
    }

    /// A `(` at `open` was never closed, or something else is in the way
    fn unclosed(&self, open: usize) -> ParseError {
        if self.at_end() {
            ParseError::UnmatchedParenthesis { position: open }
        } else {
            self.unexpected()
        }
    }

    // === Nesting ===

    fn enter(&mut self, cost: usize) -> Result<(), ParseError> {
        self.depth += cost;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self, cost: usize) {
        self.depth -= cost;
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> ParseResult {
        self.enter(1)?;
        let expr = self.parse_binary(COMPARISON)?;
        self.leave(1);
        Ok(expr)
    }

    /// A parenthesised group or function argument
    fn parse_nested_expression(&mut self) -> ParseResult {
        self.enter(NESTING_COST)?;
        let expr = self.parse_binary(COMPARISON)?;
        self.leave(NESTING_COST);
        Ok(expr)
    }

    /// Binary operators binding at least as tightly as `min_precedence`.
    ///
    /// All binary operators are left associative, so the right operand only
    /// takes operators that bind strictly tighter. A chain becomes a
    /// left-leaning tree, and every link counts one unit of depth.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult {
        let mut left = self.parse_unary()?;
        let mut chained = 0;

        while let Some(op) = self.current_operator().and_then(binary_operator) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            self.enter(1)?;
            chained += 1;
            let right = self.parse_binary(precedence + 1)?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.leave(chained);
        Ok(left)
    }

    /// Prefix `-` and `+` bind tighter than `^`, so `-2^2` is `4`.
    fn parse_unary(&mut self) -> ParseResult {
        let op = match self.current_operator() {
            Some(Operator::Minus) => UnaryOperator::Negate,
            Some(Operator::Plus) => UnaryOperator::Plus,
            _ => return self.parse_postfix(),
        };

        self.advance();
        self.enter(1)?;
        let operand = self.parse_unary()?;
        self.leave(1);

        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult {
        let mut expr = self.parse_primary()?;
        let mut applied = 0;

        while self.eat_operator(Operator::Percent) {
            self.enter(1)?;
            applied += 1;
            expr = FormulaExpr::UnaryOp {
                op: UnaryOperator::Percent,
                operand: Box::new(expr),
            };
        }

        self.leave(applied);
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(FormulaExpr::number(n))
            }

            TokenKind::String(s) => {
                self.advance();
                Ok(FormulaExpr::Literal(CellValue::Text(s)))
            }

            TokenKind::Boolean(b) => {
                self.advance();
                Ok(FormulaExpr::Literal(CellValue::Logical(b)))
            }

            TokenKind::Error(e) => {
                self.advance();
                Ok(FormulaExpr::Literal(CellValue::Error(e)))
            }

            TokenKind::CellReference { sheet, reference } => {
                self.advance();
                self.parse_reference(sheet, &reference, token.span.start)
            }

            TokenKind::Identifier(name) => {
                self.advance();
                if self.is_punct(Punctuation::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(FormulaExpr::Name(name))
                }
            }

            TokenKind::Punctuation(Punctuation::LeftParen) => {
                self.advance();
                let expr = self.parse_nested_expression()?;
                if !self.eat_punct(Punctuation::RightParen) {
                    return Err(self.unclosed(token.span.start));
                }
                Ok(expr)
            }

            _ => Err(self.unexpected()),
        }
    }

    /// A cell reference, or a range if a `:` and a second reference follow
    fn parse_reference(
        &mut self,
        sheet: Option<String>,
        reference: &str,
        position: usize,
    ) -> ParseResult {
        let start = parse_address(reference, position)?;

        if !self.eat_punct(Punctuation::Colon) {
            return Ok(FormulaExpr::Reference(Locator::Cell {
                sheet,
                address: start,
            }));
        }

        let end_token = self.current().clone();
        let (end_sheet, end_reference) = match end_token.kind {
            TokenKind::CellReference { sheet, reference } => (sheet, reference),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        let end = parse_address(&end_reference, end_token.span.start)?;

        // Sheet1!A1:B2 and Sheet1!A1:Sheet1!B2 are the same range
        let sheet = match (sheet, end_sheet) {
            (Some(first), Some(second)) if !first.eq_ignore_ascii_case(&second) => {
                return Err(ParseError::MismatchedRangeSheets { position });
            }
            (None, Some(_)) => return Err(ParseError::MismatchedRangeSheets { position }),
            (sheet, _) => sheet,
        };

        Ok(FormulaExpr::Reference(Locator::Range {
            sheet,
            range: CellRange::new(start, end),
        }))
    }

    fn parse_function_call(&mut self, name: String) -> ParseResult {
        let open = self.position();
        self.advance(); // '('

        let mut args = Vec::new();
        if !self.eat_punct(Punctuation::RightParen) {
            loop {
                args.push(self.parse_argument()?);
                if self.eat_punct(Punctuation::Comma) {
                    continue;
                }
                if self.eat_punct(Punctuation::RightParen) {
                    break;
                }
                return Err(self.unclosed(open));
            }
        }

        Ok(FormulaExpr::FunctionCall {
            name: name.to_uppercase(),
            args,
        })
    }

    /// An omitted argument is a blank literal
    fn parse_argument(&mut self) -> ParseResult {
        if self.is_punct(Punctuation::Comma) || self.is_punct(Punctuation::RightParen) {
            return Ok(FormulaExpr::Literal(CellValue::Blank));
        }
        self.parse_nested_expression()
    }
}

fn binary_operator(op: Operator) -> Option<BinaryOperator> {
    match op {
        Operator::Equal => Some(BinaryOperator::Equal),
        Operator::NotEqual => Some(BinaryOperator::NotEqual),
        Operator::Less => Some(BinaryOperator::LessThan),
        Operator::LessEqual => Some(BinaryOperator::LessEqual),
        Operator::Greater => Some(BinaryOperator::GreaterThan),
        Operator::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        Operator::Ampersand => Some(BinaryOperator::Concat),
        Operator::Plus => Some(BinaryOperator::Add),
        Operator::Minus => Some(BinaryOperator::Subtract),
        Operator::Star => Some(BinaryOperator::Multiply),
        Operator::Slash => Some(BinaryOperator::Divide),
        Operator::Caret => Some(BinaryOperator::Power),
        _ => None,
    }
}

fn parse_address(reference: &str, position: usize) -> Result<CellAddress, ParseError> {
    CellAddress::parse(reference).map_err(|_| ParseError::InvalidReference {
        reference: reference.to_string(),
        position,
    })
}
