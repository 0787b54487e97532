//! expr
//!
//! The codebase expression language.
//!
//! An expression names a repository and chains edits (`|editor`) and
//! translations (`>projectspace`) onto it:
//!
//! ```text
//! internal(revision=45)>public|renamer
//! ```
//!
//! # Modules
//!
//! - `term`: [`Term`], [`Operator`], [`Operation`]
//! - `parser`: [`parse_expression`] and [`ParseError`]
//! - `expression`: [`Expression`] and its evaluation against a
//!   [`crate::project::ProjectContext`]
//!
//! # Example
//!
//! ```
//! use moe::expr::parse_expression;
//!
//! let expr = parse_expression("foo>public|bar(option=x)")?;
//! assert_eq!(expr.to_string(), "foo>public|bar(option=x)");
//! # Ok::<(), moe::expr::ParseError>(())
//! ```

mod expression;
mod parser;
mod term;

pub use expression::Expression;
pub use parser::{parse_expression, parse_term, ParseError};
pub use term::{Operation, Operator, Options, Term};
