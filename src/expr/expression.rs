//! expr::expression
//!
//! The expression chain and its evaluation into codebases.
//!
//! # Evaluation
//!
//! Each node resolves its parent first and then applies its own step:
//!
//! - a repository node asks the named repository's codebase creator
//! - an edit node runs the named editor over its parent's codebase
//! - a translate node runs the translator from the parent's project space
//!   to the named project space
//!
//! The result is imprinted with the node itself, so the printed form of a
//! codebase's expression records every step that produced it.

use std::sync::Arc;

use crate::codebase::{Codebase, CodebaseError};
use crate::editors::TranslatorPath;
use crate::project::ProjectContext;

use super::term::{Operation, Operator, Term};

/// An immutable, persistent chain of pipeline steps.
///
/// Derived expressions share their parents. Equality is structural, with
/// term options compared as maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// A repository reference, e.g. `internal(revision=45)`.
    Repository(Term),
    /// `parent|editor(...)`
    Edit {
        parent: Arc<Expression>,
        operation: Operation,
    },
    /// `parent>projectspace`
    Translate {
        parent: Arc<Expression>,
        operation: Operation,
    },
}

impl Expression {
    /// A root expression referring to a repository.
    pub fn repository(term: Term) -> Self {
        Expression::Repository(term)
    }

    /// This expression followed by `operation`.
    pub fn then(&self, operation: Operation) -> Self {
        let parent = Arc::new(self.clone());
        match operation.operator {
            Operator::Edit => Expression::Edit { parent, operation },
            Operator::Translate => Expression::Translate { parent, operation },
        }
    }

    /// This expression followed by `|term`.
    pub fn edit_with(&self, term: Term) -> Self {
        self.then(Operation::new(Operator::Edit, term))
    }

    /// This expression followed by `>term`.
    pub fn translate_to(&self, term: Term) -> Self {
        self.then(Operation::new(Operator::Translate, term))
    }

    /// The expression this one is derived from, if any.
    pub fn parent(&self) -> Option<&Expression> {
        match self {
            Expression::Repository(_) => None,
            Expression::Edit { parent, .. } | Expression::Translate { parent, .. } => Some(parent),
        }
    }

    /// This node's operation, if it is not the root.
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Expression::Repository(_) => None,
            Expression::Edit { operation, .. } | Expression::Translate { operation, .. } => {
                Some(operation)
            }
        }
    }

    /// The term at the root of the chain.
    pub fn root_term(&self) -> &Term {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        match node {
            Expression::Repository(term) => term,
            Expression::Edit { operation, .. } | Expression::Translate { operation, .. } => {
                &operation.term
            }
        }
    }

    /// Every operation from the root outwards.
    pub fn operations(&self) -> Vec<&Operation> {
        let mut ops = Vec::new();
        let mut node = self;
        while let Some(op) = node.operation() {
            ops.push(op);
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        ops.reverse();
        ops
    }

    /// Evaluate this expression into a codebase.
    ///
    /// # Errors
    ///
    /// - [`CodebaseError::Config`] for an unknown repository
    /// - [`CodebaseError::Creation`] for an unknown editor or a missing
    ///   translator
    /// - whatever a creator, editor or translator step reports
    pub fn create_codebase(&self, context: &ProjectContext) -> Result<Codebase, CodebaseError> {
        match self {
            Expression::Repository(term) => {
                tracing::debug!(expression = %self, "creating codebase from repository");
                let repository = context.repository(term.identifier())?;
                let codebase = repository.codebase_creator.create(&term.options())?;
                Ok(codebase.copy_with_expression(self.clone()))
            }

            Expression::Edit { parent, operation } => {
                let input = parent.create_codebase(context)?;
                let name = operation.term.identifier();
                let editor = context
                    .editor(name)
                    .ok_or_else(|| CodebaseError::Creation(format!("no editor {name}")))?;

                tracing::debug!(
                    expression = %self,
                    editor = name,
                    description = %editor.description(),
                    "editing codebase"
                );
                let edited = editor.edit(&input, context, &operation.term.options())?;
                Ok(edited.copy_with_expression(self.clone()))
            }

            Expression::Translate { parent, operation } => {
                let input = parent.create_codebase(context)?;
                let path = TranslatorPath::new(input.project_space(), operation.term.identifier());
                let translator = context.translator(&path).ok_or_else(|| {
                    let available: Vec<String> =
                        context.translators().keys().map(|p| p.to_string()).collect();
                    CodebaseError::Creation(format!(
                        "Could not find translator from project space \"{}\" to \"{}\".\n\
                         Translators only available for [{}]",
                        path.from_project_space(),
                        path.to_project_space(),
                        available.join(", ")
                    ))
                })?;

                tracing::debug!(expression = %self, translator = %path, "translating codebase");
                let translated = translator.translate(&input, context, &operation.term.options())?;
                Ok(translated
                    .copy_with_project_space(path.to_project_space())
                    .copy_with_expression(self.clone()))
            }
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Repository(term) => write!(f, "{}", term),
            Expression::Edit { parent, operation } | Expression::Translate { parent, operation } => {
                write!(f, "{}{}", parent, operation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Term {
        Term::new(s).unwrap()
    }

    #[test]
    fn printed_form_concatenates_steps() {
        let expr = Expression::repository(term("foo"))
            .translate_to(term("public"))
            .edit_with(term("bar").with_option("option", "x").unwrap());
        assert_eq!(expr.to_string(), "foo>public|bar(option=x)");
    }

    #[test]
    fn derived_expressions_leave_parent_untouched() {
        let root = Expression::repository(term("foo"));
        let edited = root.edit_with(term("bar"));
        assert_eq!(root.to_string(), "foo");
        assert_eq!(edited.parent(), Some(&root));
        assert!(root.parent().is_none());
    }

    #[test]
    fn then_dispatches_on_operator() {
        let root = Expression::repository(term("foo"));
        let edit = root.then(Operation::new(Operator::Edit, term("e")));
        let translate = root.then(Operation::new(Operator::Translate, term("t")));
        assert!(matches!(edit, Expression::Edit { .. }));
        assert!(matches!(translate, Expression::Translate { .. }));
    }

    #[test]
    fn root_term_and_operations() {
        let expr = Expression::repository(term("foo"))
            .edit_with(term("a"))
            .translate_to(term("b"));
        assert_eq!(expr.root_term().identifier(), "foo");
        let ops: Vec<_> = expr.operations().iter().map(|o| o.to_string()).collect();
        assert_eq!(ops, vec!["|a", ">b"]);
    }

    #[test]
    fn equality_is_structural() {
        let a = Expression::repository(
            term("foo").with_option("x", "1").unwrap().with_option("y", "2").unwrap(),
        );
        let b = Expression::repository(
            term("foo").with_option("y", "2").unwrap().with_option("x", "1").unwrap(),
        );
        assert_eq!(a, b);
        assert_ne!(a, a.edit_with(term("e")));
    }
}
