//! Formula lexer
//!
//! Splits formula text into [`Token`]s. The lexer is a plain scanner over
//! the input; it keeps no state between calls, so [`tokenize`] can be run on
//! the same text any number of times.

use crate::error::LexError;
use std::fmt;
use tabula_core::ErrorKind;

/// Byte range of a token in the formula text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A token with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// String literal, with `""` already unescaped
    String(String),
    Boolean(bool),
    Error(ErrorKind),
    /// Function name or defined name, as written
    Identifier(String),
    /// `A1`, `$B$2`, `Sheet1!C3`, `'My Sheet'!D4`.
    ///
    /// After a sheet prefix the reference text is taken as written and
    /// checked by the parser.
    CellReference {
        sheet: Option<String>,
        reference: String,
    },
    Operator(Operator),
    Punctuation(Punctuation),
    EndOfInput,
}

/// Operator tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Ampersand,
    Percent,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Caret => "^",
            Operator::Ampersand => "&",
            Operator::Percent => "%",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
        }
    }
}

/// Punctuation tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    LeftParen,
    RightParen,
    Comma,
    Colon,
}

impl Punctuation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuation::LeftParen => "(",
            Punctuation::RightParen => ")",
            Punctuation::Comma => ",",
            Punctuation::Colon => ":",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::String(s) => write!(f, "string \"{}\"", s.replace('"', "\"\"")),
            TokenKind::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            TokenKind::Error(e) => write!(f, "error {}", e),
            TokenKind::Identifier(name) => write!(f, "identifier {}", name),
            TokenKind::CellReference {
                sheet: Some(sheet),
                reference,
            } => write!(f, "reference {}!{}", sheet, reference),
            TokenKind::CellReference {
                sheet: None,
                reference,
            } => write!(f, "reference {}", reference),
            TokenKind::Operator(op) => write!(f, "'{}'", op.as_str()),
            TokenKind::Punctuation(p) => write!(f, "'{}'", p.as_str()),
            TokenKind::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// Split formula text into tokens.
///
/// The result always ends with exactly one [`TokenKind::EndOfInput`]. A
/// leading `=` is not special here; it comes out as an `=` operator.
///
/// # Example
/// ```rust
/// use tabula_formula::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("ISBLANK(A1)").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Identifier("ISBLANK".into()));
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer { input: text, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::EndOfInput;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.pos;

        let kind = match self.peek_char() {
            None => TokenKind::EndOfInput,
            Some('"') => self.scan_string()?,
            Some('#') => self.scan_error_literal()?,
            Some('\'') => self.scan_quoted_sheet_reference()?,
            Some(c) if c.is_ascii_digit() => self.scan_number()?,
            Some('.') if self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.scan_number()?
            }
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.scan_word()?,
            Some(c) => self.scan_symbol(c)?,
        };

        Ok(Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
        })
    }

    fn scan_symbol(&mut self, c: char) -> Result<TokenKind, LexError> {
        let offset = self.pos;
        self.advance();

        let op = |op| Ok(TokenKind::Operator(op));
        let punct = |p| Ok(TokenKind::Punctuation(p));
        match c {
            '+' => op(Operator::Plus),
            '-' => op(Operator::Minus),
            '*' => op(Operator::Star),
            '/' => op(Operator::Slash),
            '^' => op(Operator::Caret),
            '&' => op(Operator::Ampersand),
            '%' => op(Operator::Percent),
            '=' => op(Operator::Equal),
            '<' => {
                if self.eat('=') {
                    op(Operator::LessEqual)
                } else if self.eat('>') {
                    op(Operator::NotEqual)
                } else {
                    op(Operator::Less)
                }
            }
            '>' => {
                if self.eat('=') {
                    op(Operator::GreaterEqual)
                } else {
                    op(Operator::Greater)
                }
            }
            '(' => punct(Punctuation::LeftParen),
            ')' => punct(Punctuation::RightParen),
            ',' => punct(Punctuation::Comma),
            ':' => punct(Punctuation::Colon),
            _ => Err(LexError::UnexpectedCharacter { ch: c, offset }),
        }
    }

    fn scan_string(&mut self) -> Result<TokenKind, LexError> {
        let offset = self.pos;
        self.advance(); // Opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Err(LexError::UnterminatedString { offset }),
                Some('"') => {
                    self.advance();
                    // "" is an escaped quote
                    if self.eat('"') {
                        s.push('"');
                    } else {
                        return Ok(TokenKind::String(s));
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;

        self.skip_digits();
        if self.eat('.') {
            self.skip_digits();
        }

        // Exponent part
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_char_at(1), Some('+' | '-')));
            if !self
                .peek_char_at(1 + sign)
                .map_or(false, |c| c.is_ascii_digit())
            {
                return Err(LexError::MalformedNumber { offset: start });
            }
            for _ in 0..=sign {
                self.advance();
            }
            self.skip_digits();
        }

        match self.input[start..self.pos].parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenKind::Number(n)),
            _ => Err(LexError::MalformedNumber { offset: start }),
        }
    }

    /// The seven error literals, longest match first
    fn scan_error_literal(&mut self) -> Result<TokenKind, LexError> {
        let offset = self.pos;
        let rest = &self.input[self.pos..];

        let mut kinds = ErrorKind::ALL;
        kinds.sort_by_key(|kind| std::cmp::Reverse(kind.as_str().len()));

        for kind in kinds {
            let literal = kind.as_str();
            let matched = rest
                .get(..literal.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(literal));
            if matched {
                self.pos += literal.len();
                return Ok(TokenKind::Error(kind));
            }
        }

        Err(LexError::UnknownErrorLiteral { offset })
    }

    /// Identifier, boolean, cell reference or sheet prefix
    fn scan_word(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.skip_word_chars();
        let text = &self.input[start..self.pos];

        // Sheet1!A1
        if self.peek_char() == Some('!') {
            reject_dollar(text, start)?;
            self.advance();
            return Ok(self.scan_qualified_reference(text.to_string()));
        }

        // A word followed by '(' is always a function name: LOG10(100), TRUE()
        let is_call = self.peek_char() == Some('(');

        if !is_call && looks_like_cell_reference(text) {
            return Ok(TokenKind::CellReference {
                sheet: None,
                reference: text.to_string(),
            });
        }

        reject_dollar(text, start)?;

        if !is_call {
            if text.eq_ignore_ascii_case("TRUE") {
                return Ok(TokenKind::Boolean(true));
            }
            if text.eq_ignore_ascii_case("FALSE") {
                return Ok(TokenKind::Boolean(false));
            }
        }

        Ok(TokenKind::Identifier(text.to_string()))
    }

    /// `'My Sheet'!A1`; `''` inside the quotes is one apostrophe
    fn scan_quoted_sheet_reference(&mut self) -> Result<TokenKind, LexError> {
        let offset = self.pos;
        self.advance();

        let mut sheet = String::new();
        loop {
            match self.peek_char() {
                None => return Err(LexError::UnterminatedSheetName { offset }),
                Some('\'') => {
                    self.advance();
                    if !self.eat('\'') {
                        break;
                    }
                    sheet.push('\'');
                }
                Some(c) => {
                    sheet.push(c);
                    self.advance();
                }
            }
        }

        if !self.eat('!') {
            return Err(LexError::UnterminatedSheetName { offset });
        }
        Ok(self.scan_qualified_reference(sheet))
    }

    fn scan_qualified_reference(&mut self, sheet: String) -> TokenKind {
        let start = self.pos;
        self.skip_word_chars();
        TokenKind::CellReference {
            sheet: Some(sheet),
            reference: self.input[start..self.pos].to_string(),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().map_or(false, &pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    fn skip_digits(&mut self) {
        self.skip_while(|c| c.is_ascii_digit());
    }

    fn skip_word_chars(&mut self) {
        self.skip_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'));
    }
}

/// `$` only belongs in cell references
fn reject_dollar(text: &str, start: usize) -> Result<(), LexError> {
    match text.find('$') {
        Some(i) => Err(LexError::UnexpectedCharacter {
            ch: '$',
            offset: start + i,
        }),
        None => Ok(()),
    }
}

/// `[$]letters[$]digits` with one to three column letters.
///
/// Only the shape is checked; the parser rejects out-of-bounds addresses.
fn looks_like_cell_reference(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if bytes.get(i) == Some(&b'$') {
        i += 1;
    }
    let letters = bytes[i..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
    if !(1..=3).contains(&letters) {
        return false;
    }
    i += letters;

    if bytes.get(i) == Some(&b'$') {
        i += 1;
    }
    let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && i + digits == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn cell(reference: &str) -> TokenKind {
        TokenKind::CellReference {
            sheet: None,
            reference: reference.into(),
        }
    }

    #[test]
    fn test_tokenize_call() {
        assert_eq!(
            kinds("=ISBLANK(A1)"),
            vec![
                TokenKind::Operator(Operator::Equal),
                TokenKind::Identifier("ISBLANK".into()),
                TokenKind::Punctuation(Punctuation::LeftParen),
                cell("A1"),
                TokenKind::Punctuation(Punctuation::RightParen),
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("  1 + foo").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(2, 3), (4, 5), (6, 9), (9, 9)]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 2.5 .5 1e3 2E-2 7."),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(2.5),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.02),
                TokenKind::Number(7.0),
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(
            tokenize("1+2e").unwrap_err(),
            LexError::MalformedNumber { offset: 2 }
        );
        assert_eq!(
            tokenize("1e999").unwrap_err(),
            LexError::MalformedNumber { offset: 0 }
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""say ""hi""" """#),
            vec![
                TokenKind::String("say \"hi\"".into()),
                TokenKind::String("".into()),
                TokenKind::EndOfInput,
            ]
        );
        assert_eq!(
            tokenize("=\"abc").unwrap_err(),
            LexError::UnterminatedString { offset: 1 }
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(
            kinds("TRUE false True()"),
            vec![
                TokenKind::Boolean(true),
                TokenKind::Boolean(false),
                TokenKind::Identifier("True".into()),
                TokenKind::Punctuation(Punctuation::LeftParen),
                TokenKind::Punctuation(Punctuation::RightParen),
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_error_literals() {
        for kind in ErrorKind::ALL {
            assert_eq!(
                kinds(kind.as_str()),
                vec![TokenKind::Error(kind), TokenKind::EndOfInput]
            );
        }
        assert_eq!(kinds("#n/a")[0], TokenKind::Error(ErrorKind::NotAvailable));
        assert_eq!(
            tokenize("1+#BOGUS!").unwrap_err(),
            LexError::UnknownErrorLiteral { offset: 2 }
        );
        assert_eq!(
            tokenize("#GETTING_DATA").unwrap_err(),
            LexError::UnknownErrorLiteral { offset: 0 }
        );
    }

    #[test]
    fn test_operators() {
        let ops: Vec<_> = kinds("+ - * / ^ & % = <> < <= > >=")
            .into_iter()
            .filter_map(|k| match k {
                TokenKind::Operator(op) => Some(op.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec!["+", "-", "*", "/", "^", "&", "%", "=", "<>", "<", "<=", ">", ">="]
        );
    }

    #[test]
    fn test_cell_references() {
        assert_eq!(
            kinds("A1:$B$2"),
            vec![
                cell("A1"),
                TokenKind::Punctuation(Punctuation::Colon),
                cell("$B$2"),
                TokenKind::EndOfInput,
            ]
        );
        // Four letters is a name, not a column
        assert_eq!(kinds("ABCD1")[0], TokenKind::Identifier("ABCD1".into()));
        // A cell-shaped word before '(' is a function
        assert_eq!(kinds("LOG10(1)")[0], TokenKind::Identifier("LOG10".into()));
    }

    #[test]
    fn test_sheet_references() {
        assert_eq!(
            kinds("Sheet1!A1 'My ''Data'''!$C$3"),
            vec![
                TokenKind::CellReference {
                    sheet: Some("Sheet1".into()),
                    reference: "A1".into(),
                },
                TokenKind::CellReference {
                    sheet: Some("My 'Data'".into()),
                    reference: "$C$3".into(),
                },
                TokenKind::EndOfInput,
            ]
        );
        assert_eq!(
            tokenize("'Open!A1").unwrap_err(),
            LexError::UnterminatedSheetName { offset: 0 }
        );
        assert_eq!(
            tokenize("'Data'A1").unwrap_err(),
            LexError::UnterminatedSheetName { offset: 0 }
        );
    }

    #[test]
    fn test_identifiers_with_dots() {
        assert_eq!(
            kinds("ERROR.TYPE(x)")[..2],
            [
                TokenKind::Identifier("ERROR.TYPE".into()),
                TokenKind::Punctuation(Punctuation::LeftParen),
            ]
        );
    }

    #[test]
    fn test_unexpected_characters() {
        assert_eq!(
            tokenize("1 ; 2").unwrap_err(),
            LexError::UnexpectedCharacter { ch: ';', offset: 2 }
        );
        assert_eq!(
            tokenize("foo$bar").unwrap_err(),
            LexError::UnexpectedCharacter { ch: '$', offset: 3 }
        );
        assert_eq!(tokenize("{1}").unwrap_err().offset(), 0);
    }

    #[test]
    fn test_restartable() {
        let text = "=IF(A1>0,\"yes\",#N/A)";
        assert_eq!(tokenize(text).unwrap(), tokenize(text).unwrap());
    }
}
