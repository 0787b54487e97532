//! expr::term
//!
//! Terms, operators and operations of the codebase expression language.
//!
//! A [`Term`] is a name plus key/value options, e.g. `internal(revision=45)`.
//! An [`Operation`] joins an [`Operator`] to a term, e.g. `>public` or
//! `|renamer(prefix=src)`.
//!
//! # Equality
//!
//! Terms compare structurally with their options treated as a map, so
//! `a(x=1,y=2)` equals `a(y=2,x=1)`. Printing keeps the order options were
//! written in, and a value written in quotes keeps its quotes even when it
//! could have been bare.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use super::parser::ParseError;

/// Options passed to creators, editors and translators.
pub type Options = BTreeMap<String, String>;

/// Characters that cannot appear in an unquoted option value.
const RESERVED_CHARS: [char; 7] = ['|', '>', '(', ')', ',', '=', '"'];

/// Identifiers and option keys: ASCII alphanumerics and `_-.:/@`.
pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '/' | '@')
}

/// Option values may be written bare if they avoid these characters.
pub(crate) fn is_bare_value_char(c: char) -> bool {
    !c.is_whitespace() && c != '\\' && !RESERVED_CHARS.contains(&c)
}

/// A named reference plus options.
///
/// # Example
///
/// ```
/// use moe::expr::Term;
///
/// let term = Term::new("internal")?
///     .with_option("revision", "45")?;
/// assert_eq!(term.to_string(), "internal(revision=45)");
/// assert_eq!(term.option("revision"), Some("45"));
///
/// // Option keys are unique within a term.
/// assert!(term.with_option("revision", "46").is_err());
/// # Ok::<(), moe::expr::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Term {
    identifier: String,
    options: Vec<TermOption>,
}

#[derive(Debug, Clone)]
struct TermOption {
    key: String,
    value: String,
    /// Written as a quoted string. Only affects printing.
    quoted: bool,
}

impl Term {
    /// Create a term with no options.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidIdentifier`] if the identifier is empty or
    /// uses anything besides ASCII alphanumerics and `_-.:/@`.
    pub fn new(identifier: impl Into<String>) -> Result<Self, ParseError> {
        let identifier = identifier.into();
        validate_word(&identifier)?;
        Ok(Self {
            identifier,
            options: Vec::new(),
        })
    }

    /// Return this term with one more option.
    ///
    /// # Errors
    ///
    /// - [`ParseError::InvalidIdentifier`] if the key is not a valid word
    /// - [`ParseError::DuplicateOption`] if the key is already present
    pub fn with_option(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ParseError> {
        self.push_option(key.into(), value.into(), false)
    }

    /// Like [`Term::with_option`], but the value prints in quotes even if
    /// it could be written bare.
    ///
    /// ```
    /// use moe::expr::Term;
    ///
    /// let quoted = Term::new("patch")?.with_quoted_option("file", "/a.txt")?;
    /// assert_eq!(quoted.to_string(), r#"patch(file="/a.txt")"#);
    /// assert_eq!(quoted, Term::new("patch")?.with_option("file", "/a.txt")?);
    /// # Ok::<(), moe::expr::ParseError>(())
    /// ```
    pub fn with_quoted_option(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ParseError> {
        self.push_option(key.into(), value.into(), true)
    }

    fn push_option(mut self, key: String, value: String, quoted: bool) -> Result<Self, ParseError> {
        validate_word(&key)?;
        if self.options.iter().any(|o| o.key == key) {
            return Err(ParseError::DuplicateOption {
                key,
                term: self.identifier,
            });
        }
        self.options.push(TermOption { key, value, quoted });
        Ok(self)
    }

    /// The term's name.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The value of one option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// Options in the order they were written.
    pub fn ordered_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|o| (o.key.as_str(), o.value.as_str()))
    }

    /// Options as a map, for handing to creators and editors.
    pub fn options(&self) -> Options {
        self.options
            .iter()
            .map(|o| (o.key.clone(), o.value.clone()))
            .collect()
    }

    fn canonical_options(&self) -> Vec<(&str, &str)> {
        let mut sorted: Vec<_> = self.ordered_options().collect();
        sorted.sort();
        sorted
    }
}

fn validate_word(word: &str) -> Result<(), ParseError> {
    if word.is_empty() || !word.chars().all(is_identifier_char) {
        return Err(ParseError::InvalidIdentifier(word.to_string()));
    }
    Ok(())
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.canonical_options() == other.canonical_options()
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
        self.canonical_options().hash(state);
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier)?;
        if self.options.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}=", option.key)?;
            write_value(f, &option.value, option.quoted)?;
        }
        f.write_str(")")
    }
}

/// Values that are not plain words are written as quoted strings.
fn write_value(f: &mut std::fmt::Formatter<'_>, value: &str, quoted: bool) -> std::fmt::Result {
    if !quoted && !value.is_empty() && value.chars().all(is_bare_value_char) {
        return f.write_str(value);
    }
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

/// The two pipeline connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `|` - apply a named editor
    Edit,
    /// `>` - translate into a project space
    Translate,
}

impl Operator {
    /// The character this operator is written as.
    pub fn symbol(&self) -> char {
        match self {
            Operator::Edit => '|',
            Operator::Translate => '>',
        }
    }

    /// The operator written as `c`, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use moe::expr::Operator;
    ///
    /// assert_eq!(Operator::from_symbol('|'), Some(Operator::Edit));
    /// assert_eq!(Operator::from_symbol('>'), Some(Operator::Translate));
    /// assert_eq!(Operator::from_symbol('+'), None);
    /// ```
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '|' => Some(Operator::Edit),
            '>' => Some(Operator::Translate),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An operator applied to a term, e.g. `>public`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub operator: Operator,
    pub term: Term,
}

impl Operation {
    pub fn new(operator: Operator, term: Term) -> Self {
        Self { operator, term }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: &str, options: &[(&str, &str)]) -> Term {
        options
            .iter()
            .fold(Term::new(id).unwrap(), |t, (k, v)| t.with_option(*k, *v).unwrap())
    }

    #[test]
    fn bare_term_prints_identifier() {
        assert_eq!(term("public", &[]).to_string(), "public");
    }

    #[test]
    fn options_print_in_written_order() {
        let t = term("patch", &[("z", "1"), ("a", "2")]);
        assert_eq!(t.to_string(), "patch(z=1,a=2)");
    }

    #[test]
    fn values_needing_quotes_are_quoted() {
        let t = term("internal", &[("revision", "3,4,5")]);
        assert_eq!(t.to_string(), r#"internal(revision="3,4,5")"#);

        let t = term("file", &[("path", r#"a "b" c"#)]);
        assert_eq!(t.to_string(), r#"file(path="a \"b\" c")"#);

        let t = term("x", &[("empty", "")]);
        assert_eq!(t.to_string(), r#"x(empty="")"#);
    }

    #[test]
    fn quoted_values_keep_their_quotes() {
        let t = Term::new("patch")
            .unwrap()
            .with_quoted_option("file", "/path/to/path.txt")
            .unwrap()
            .with_option("mode", "strict")
            .unwrap();
        assert_eq!(t.to_string(), r#"patch(file="/path/to/path.txt",mode=strict)"#);
        assert_eq!(
            t,
            term("patch", &[("file", "/path/to/path.txt"), ("mode", "strict")])
        );
    }

    #[test]
    fn equality_ignores_option_order() {
        let a = term("t", &[("x", "1"), ("y", "2")]);
        let b = term("t", &[("y", "2"), ("x", "1")]);
        assert_eq!(a, b);
        assert_ne!(a.to_string(), b.to_string());
        assert_ne!(a, term("t", &[("x", "1")]));
    }

    #[test]
    fn invalid_identifiers_rejected() {
        assert!(Term::new("").is_err());
        assert!(Term::new("a|b").is_err());
        assert!(Term::new("a b").is_err());
        assert!(Term::new("pub>lic").is_err());
        assert!(Term::new("a+b").is_err());
    }

    #[test]
    fn duplicate_option_rejected() {
        let err = term("t", &[("k", "1")]).with_option("k", "2").unwrap_err();
        assert_eq!(err.to_string(), "duplicate option 'k' in term 't'");
    }

    #[test]
    fn options_map() {
        let t = term("t", &[("b", "2"), ("a", "1")]);
        let opts = t.options();
        assert_eq!(opts.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn operation_prints_operator_then_term() {
        let op = Operation::new(Operator::Edit, term("renamer", &[("p", "x")]));
        assert_eq!(op.to_string(), "|renamer(p=x)");
        let op = Operation::new(Operator::Translate, term("public", &[]));
        assert_eq!(op.to_string(), ">public");
    }
}
