//! Formula error types
//!
//! These are failures to *accept* a formula. A formula that is accepted but
//! fails while computing produces an in-band [`tabula_core::ErrorKind`]
//! value instead.

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while turning formula text into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A string literal has no closing quote
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A character that starts no token
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    /// `#` not followed by one of the seven error literals
    #[error("unknown error literal at offset {offset}")]
    UnknownErrorLiteral { offset: usize },

    /// A numeric literal that does not form a finite number
    #[error("malformed number at offset {offset}")]
    MalformedNumber { offset: usize },

    /// A quoted sheet name without its closing `'!`
    #[error("unterminated sheet name starting at offset {offset}")]
    UnterminatedSheetName { offset: usize },
}

impl LexError {
    /// Byte offset of the offending input
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { offset }
            | LexError::UnexpectedCharacter { offset, .. }
            | LexError::UnknownErrorLiteral { offset }
            | LexError::MalformedNumber { offset }
            | LexError::UnterminatedSheetName { offset } => *offset,
        }
    }
}

/// Errors raised while building an expression tree from tokens.
///
/// Positions are byte offsets of the token where the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No expression at all
    #[error("empty formula")]
    EmptyFormula,

    /// A token that cannot appear here
    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// A `(` without its `)`, or a stray `)`
    #[error("unmatched parenthesis at position {position}")]
    UnmatchedParenthesis { position: usize },

    /// Reference text that names no cell, or a range endpoint that is not a
    /// cell reference
    #[error("invalid reference '{reference}' at position {position}")]
    InvalidReference { reference: String, position: usize },

    /// `Sheet1!A1:Sheet2!B2`
    #[error("range at position {position} spans two sheets")]
    MismatchedRangeSheets { position: usize },

    /// The expression nests deeper than the configured limit
    #[error("formula nests deeper than {max_depth} levels")]
    NestingTooDeep { max_depth: usize },
}

/// Errors that can occur while accepting a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Tokenization failed
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    /// Parsing failed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}
