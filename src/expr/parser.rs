//! expr::parser
//!
//! Parser for codebase expressions.
//!
//! # Grammar
//!
//! ```text
//! expression := term operation*
//! term       := identifier [ '(' kv (',' kv)* ')' ]
//! operation  := ('|' | '>') term
//! kv         := key '=' value
//! value      := bare-value | '"' (escaped char)* '"'
//! ```
//!
//! Identifiers and keys use ASCII alphanumerics and `_-.:/@`. Values that
//! contain whitespace or any of `|>(),="\` must be quoted; inside quotes
//! `\"` and `\\` are escapes. No whitespace is allowed between tokens.
//!
//! Parsing is pure: it performs no I/O.
//!
//! # Example
//!
//! ```
//! use moe::expr::parse_expression;
//!
//! let expr = parse_expression("internal(revision=45)>public|scrub")?;
//! assert_eq!(expr.to_string(), "internal(revision=45)>public|scrub");
//! assert_eq!(expr.root_term().identifier(), "internal");
//!
//! assert!(parse_expression("internal+public").is_err());
//! # Ok::<(), moe::expr::ParseError>(())
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use super::expression::Expression;
use super::term::{is_bare_value_char, is_identifier_char, Operation, Operator, Term};

/// Syntax errors in a codebase expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid operator '{character}' at offset {offset}")]
    InvalidOperator { character: char, offset: usize },

    #[error("unexpected character '{character}' at offset {offset}, expected {expected}")]
    UnexpectedCharacter {
        character: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("invalid identifier \"{0}\"")]
    InvalidIdentifier(String),

    #[error("duplicate option '{key}' in term '{term}'")]
    DuplicateOption { key: String, term: String },
}

/// Parse an expression string into an expression chain.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending character or token.
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    let mut parser = Parser::new(input);
    let mut expression = Expression::repository(parser.term()?);

    while let Some((offset, c)) = parser.peek() {
        let operator =
            Operator::from_symbol(c).ok_or(ParseError::InvalidOperator { character: c, offset })?;
        parser.bump();
        let term = parser.term()?;
        expression = expression.then(Operation::new(operator, term));
    }

    Ok(expression)
}

/// Parse a single term such as `internal(revision=45)`.
pub fn parse_term(input: &str) -> Result<Term, ParseError> {
    let mut parser = Parser::new(input);
    let term = parser.term()?;
    match parser.peek() {
        None => Ok(term),
        Some((offset, c)) => Err(ParseError::UnexpectedCharacter {
            character: c,
            offset,
            expected: "end of term",
        }),
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn offset(&mut self) -> usize {
        self.peek().map_or(self.input.len(), |(i, _)| i)
    }

    fn unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some((offset, character)) => ParseError::UnexpectedCharacter {
                character,
                offset,
                expected,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some((_, c)) if c == wanted => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Consume the longest run of characters satisfying `accept`.
    fn run(&mut self, accept: fn(char) -> bool) -> &'a str {
        let input = self.input;
        let start = self.offset();
        while matches!(self.peek(), Some((_, c)) if accept(c)) {
            self.bump();
        }
        &input[start..self.offset()]
    }

    fn identifier(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        let word = self.run(is_identifier_char);
        if word.is_empty() {
            return Err(self.unexpected(expected));
        }
        Ok(word)
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        let mut term = Term::new(self.identifier("identifier")?)?;

        if !matches!(self.peek(), Some((_, '('))) {
            return Ok(term);
        }
        self.bump();

        loop {
            let key = self.identifier("option key")?;
            self.expect('=', "'='")?;
            term = match self.value()? {
                (value, true) => term.with_quoted_option(key, value)?,
                (value, false) => term.with_option(key, value)?,
            };

            match self.peek() {
                Some((_, ',')) => {
                    self.bump();
                }
                Some((_, ')')) => {
                    self.bump();
                    return Ok(term);
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    /// An option value, and whether it was written in quotes.
    fn value(&mut self) -> Result<(String, bool), ParseError> {
        if !matches!(self.peek(), Some((_, '"'))) {
            let bare = self.run(is_bare_value_char);
            if bare.is_empty() {
                return Err(self.unexpected("option value"));
            }
            return Ok((bare.to_string(), false));
        }
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                Some((_, '"')) => return Ok((value, true)),
                Some((_, '\\')) => match self.bump() {
                    Some((_, c)) => value.push(c),
                    None => return Err(ParseError::UnexpectedEnd { expected: "'\"'" }),
                },
                Some((_, c)) => value.push(c),
                None => return Err(ParseError::UnexpectedEnd { expected: "'\"'" }),
            }
        }
    }
}
