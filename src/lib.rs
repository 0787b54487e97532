//! MOE - Make Open Easy
//!
//! MOE keeps a codebase that lives in several repositories in sync. An
//! internal repository and its public mirror hold the same project in
//! different "project spaces"; MOE describes how to get from one to the
//! other and remembers which revisions already agree.
//!
//! # Architecture
//!
//! - [`expr`] - The codebase expression language: `internal(revision=4)>public|renamer`
//! - [`codebase`] - A directory of files tagged with its project space and origin
//! - [`project`] - Everything an expression can reference, built from config
//! - [`repositories`] - Backend registry plus the git, file and noop backends
//! - [`editors`] - Codebase transformations and translator pipelines
//! - [`database`] - The equivalence ledger and history search
//! - [`core`] - Revisions, configuration and scratch directories
//! - [`git`] - Single interface for all Git operations
//! - [`cli`] - Command-line interface layer
//! - [`ui`] - Console output
//!
//! # Invariants
//!
//! 1. Expressions evaluate lazily; nothing touches disk until
//!    [`expr::Expression::create_codebase`] is called
//! 2. Every codebase knows the expression that produced it
//! 3. A writer only accepts codebases in its repository's project space
//! 4. Equivalences are unordered and never recorded twice

pub mod cli;
pub mod codebase;
pub mod core;
pub mod database;
pub mod editors;
pub mod expr;
pub mod git;
pub mod project;
pub mod repositories;
pub mod ui;
