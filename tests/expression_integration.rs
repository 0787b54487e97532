//! Integration tests for expression evaluation.
//!
//! These tests wire a project context from hand-written creators and
//! editors that only hand out paths, so each evaluation step can be
//! observed without touching disk.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use moe::codebase::{Codebase, CodebaseCreator, CodebaseError};
use moe::core::config::RepositoryConfig;
use moe::core::fs::FileSystem;
use moe::editors::{Editor, Translator, TranslatorPath, TranslatorStep};
use moe::expr::{parse_expression, Expression, Options, Term};
use moe::project::ProjectContext;
use moe::repositories::{NoopRepositoryFactory, RepositoryFactory, RepositoryType};

/// Hands out one fixed codebase and records the options it was asked for.
struct FixedCreator {
    path: PathBuf,
    project_space: String,
    seen: Mutex<Vec<Options>>,
}

impl FixedCreator {
    fn new(path: &str, project_space: &str) -> Arc<Self> {
        Arc::new(Self {
            path: PathBuf::from(path),
            project_space: project_space.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl CodebaseCreator for FixedCreator {
    fn create(&self, options: &Options) -> Result<Codebase, CodebaseError> {
        self.seen.lock().unwrap().push(options.clone());
        let placeholder = Expression::repository(Term::new("placeholder").unwrap());
        Ok(Codebase::new(self.path.clone(), self.project_space.clone(), placeholder))
    }
}

/// Moves the codebase to a fixed path, keeping everything else.
struct MoveTo(&'static str);

impl Editor for MoveTo {
    fn description(&self) -> String {
        format!("move to {}", self.0)
    }

    fn edit(
        &self,
        input: &Codebase,
        _context: &ProjectContext,
        _options: &Options,
    ) -> Result<Codebase, CodebaseError> {
        Ok(Codebase::new(
            self.0,
            input.project_space(),
            input.expression().clone(),
        ))
    }
}

/// Always fails.
struct Broken;

impl Editor for Broken {
    fn description(&self) -> String {
        "broken".into()
    }

    fn edit(
        &self,
        _input: &Codebase,
        _context: &ProjectContext,
        _options: &Options,
    ) -> Result<Codebase, CodebaseError> {
        Err(CodebaseError::Creation("broken editor".into()))
    }
}

fn repository(name: &str, creator: Arc<FixedCreator>) -> RepositoryType {
    let fs = Arc::new(FileSystem::new());
    let config = RepositoryConfig::new("noop").with_project_space(creator.project_space.clone());
    let mut repository = NoopRepositoryFactory::new(fs).create(name, &config).unwrap();
    repository.codebase_creator = creator;
    repository
}

fn foo_project(creator: Arc<FixedCreator>) -> ProjectContext {
    ProjectContext::builder()
        .repository(repository("foo", creator))
        .translator(
            TranslatorPath::new("foo", "public"),
            Translator::new(vec![TranslatorStep::new("move", Arc::new(MoveTo("/translated")))]),
        )
        .editor("bar", Arc::new(MoveTo("/final")))
        .editor("broken", Arc::new(Broken))
        .build()
}

#[test]
fn unknown_repository_lists_none_found() {
    let context = ProjectContext::builder().build();
    let expr = parse_expression("foo").unwrap();

    let err = expr.create_codebase(&context).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No such repository 'foo' in the config. Found: []"
    );
}

#[test]
fn unknown_repository_lists_configured_names() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let err = parse_expression("bar")
        .unwrap()
        .create_codebase(&context)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No such repository 'bar' in the config. Found: [foo]"
    );
}

#[test]
fn repository_options_reach_the_creator() {
    let creator = FixedCreator::new("/first", "foo");
    let context = foo_project(creator.clone());
    let expr = parse_expression("foo(revision=45,mode=\"a b\")").unwrap();

    let codebase = expr.create_codebase(&context).unwrap();

    assert_eq!(codebase.path(), PathBuf::from("/first"));
    assert_eq!(codebase.project_space(), "foo");
    assert_eq!(codebase.expression(), &expr);

    let seen = creator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("revision").map(String::as_str), Some("45"));
    assert_eq!(seen[0].get("mode").map(String::as_str), Some("a b"));
}

#[test]
fn unknown_editor_fails() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let err = parse_expression("foo|noSuchEditor")
        .unwrap()
        .create_codebase(&context)
        .unwrap_err();
    assert_eq!(err.to_string(), "no editor noSuchEditor");
}

#[test]
fn missing_translator_lists_available_paths() {
    let creator = FixedCreator::new("/first", "foo");
    let context = ProjectContext::builder()
        .repository(repository("foo", creator))
        .translator(TranslatorPath::new("foo", "bar"), Translator::default())
        .build();

    let err = parse_expression("foo>public")
        .unwrap()
        .create_codebase(&context)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Could not find translator from project space \"foo\" to \"public\".\n\
         Translators only available for [foo>bar]"
    );
}

#[test]
fn translate_then_edit() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let expr = parse_expression("foo>public|bar").unwrap();

    let codebase = expr.create_codebase(&context).unwrap();

    assert_eq!(codebase.path(), PathBuf::from("/final"));
    assert_eq!(codebase.project_space(), "public");
    assert_eq!(codebase.expression().to_string(), "foo>public|bar");
    assert_eq!(codebase.to_string(), "foo>public|bar");
}

#[test]
fn translation_alone_retags_project_space() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let codebase = parse_expression("foo>public")
        .unwrap()
        .create_codebase(&context)
        .unwrap();

    assert_eq!(codebase.path(), PathBuf::from("/translated"));
    assert_eq!(codebase.project_space(), "public");
}

#[test]
fn editing_keeps_project_space() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let codebase = parse_expression("foo|bar")
        .unwrap()
        .create_codebase(&context)
        .unwrap();

    assert_eq!(codebase.path(), PathBuf::from("/final"));
    assert_eq!(codebase.project_space(), "foo");
}

#[test]
fn first_failing_step_aborts() {
    let context = foo_project(FixedCreator::new("/first", "foo"));
    let err = parse_expression("foo|broken|bar")
        .unwrap()
        .create_codebase(&context)
        .unwrap_err();
    assert_eq!(err.to_string(), "broken editor");
}

#[test]
fn evaluation_is_lazy() {
    let creator = FixedCreator::new("/first", "foo");
    let context = foo_project(creator.clone());

    let expr = parse_expression("foo>public|bar").unwrap();
    assert!(creator.seen.lock().unwrap().is_empty());

    expr.create_codebase(&context).unwrap();
    expr.create_codebase(&context).unwrap();
    assert_eq!(creator.seen.lock().unwrap().len(), 2);
}
