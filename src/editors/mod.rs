//! editors
//!
//! Editors, and the translators built from them.
//!
//! # Architecture
//!
//! An [`Editor`] turns one codebase into another. Editors keep the input's
//! project space; translators change it. A [`Translator`] is an ordered
//! list of named editor steps, registered under the [`TranslatorPath`] it
//! converts along. Only direct paths are used: no chaining through
//! intermediate project spaces.
//!
//! # Built-in editors
//!
//! - `identity` - copies the codebase unchanged
//! - `renamer` - moves files between path prefixes
//!
//! # Example
//!
//! ```
//! use moe::editors::TranslatorPath;
//!
//! let path = TranslatorPath::new("internal", "public");
//! assert_eq!(path.to_string(), "internal>public");
//! ```

mod identity;
mod renamer;

use std::sync::Arc;

use crate::codebase::{Codebase, CodebaseError};
use crate::core::config::{ConfigError, EditorConfig, TranslatorConfig};
use crate::expr::Options;
use crate::project::ProjectContext;

pub use identity::IdentityEditor;
pub use renamer::RenamingEditor;

/// Transforms a codebase into a new codebase.
pub trait Editor: Send + Sync {
    /// A short human-readable description of what this editor does.
    fn description(&self) -> String;

    /// Produce an edited copy of `input`. The input is not modified.
    fn edit(
        &self,
        input: &Codebase,
        context: &ProjectContext,
        options: &Options,
    ) -> Result<Codebase, CodebaseError>;
}

/// Build the editor a config entry describes.
pub fn create_editor(config: &EditorConfig) -> Result<Arc<dyn Editor>, ConfigError> {
    config.validate()?;
    Ok(match config {
        EditorConfig::Identity => Arc::new(IdentityEditor),
        EditorConfig::Renamer { mappings } => Arc::new(RenamingEditor::new(mappings.clone())),
    })
}

/// The project spaces a translator converts between.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranslatorPath {
    from_project_space: String,
    to_project_space: String,
}

impl TranslatorPath {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_project_space: from.into(),
            to_project_space: to.into(),
        }
    }

    pub fn from_project_space(&self) -> &str {
        &self.from_project_space
    }

    pub fn to_project_space(&self) -> &str {
        &self.to_project_space
    }
}

impl std::fmt::Display for TranslatorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}>{}", self.from_project_space, self.to_project_space)
    }
}

/// One named editor application within a translator.
#[derive(Clone)]
pub struct TranslatorStep {
    pub name: String,
    pub editor: Arc<dyn Editor>,
}

impl TranslatorStep {
    pub fn new(name: impl Into<String>, editor: Arc<dyn Editor>) -> Self {
        Self {
            name: name.into(),
            editor,
        }
    }
}

impl std::fmt::Debug for TranslatorStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorStep")
            .field("name", &self.name)
            .field("editor", &self.editor.description())
            .finish()
    }
}

/// Converts codebases from one project space to another.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    steps: Vec<TranslatorStep>,
}

impl Translator {
    pub fn new(steps: Vec<TranslatorStep>) -> Self {
        Self { steps }
    }

    /// Build a translator and its path from config.
    pub fn from_config(config: &TranslatorConfig) -> Result<(TranslatorPath, Self), ConfigError> {
        config.validate()?;
        let steps = config
            .steps
            .iter()
            .map(|step| Ok(TranslatorStep::new(&step.name, create_editor(&step.editor)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let path = TranslatorPath::new(&config.from_project_space, &config.to_project_space);
        Ok((path, Self::new(steps)))
    }

    pub fn steps(&self) -> &[TranslatorStep] {
        &self.steps
    }

    /// Run every step in order, each on the previous step's output.
    ///
    /// Every step gets the same `options`. The first failing step aborts
    /// the translation with its own error. The result keeps the input's
    /// project space; the caller re-tags it.
    pub fn translate(
        &self,
        input: &Codebase,
        context: &ProjectContext,
        options: &Options,
    ) -> Result<Codebase, CodebaseError> {
        let mut current = input.clone();
        for step in &self.steps {
            tracing::debug!(step = %step.name, editor = %step.editor.description(), "running translator step");
            current = step.editor.edit(&current, context, options)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::core::config::StepConfig;

    #[test]
    fn paths_order_and_print() {
        let mut paths = vec![
            TranslatorPath::new("public", "internal"),
            TranslatorPath::new("internal", "public"),
        ];
        paths.sort();
        let printed: Vec<_> = paths.iter().map(ToString::to_string).collect();
        assert_eq!(printed, vec!["internal>public", "public>internal"]);
    }

    #[test]
    fn translator_from_config_keeps_step_order() {
        let config = TranslatorConfig {
            from_project_space: "internal".into(),
            to_project_space: "public".into(),
            steps: vec![
                StepConfig {
                    name: "first".into(),
                    editor: EditorConfig::Identity,
                },
                StepConfig {
                    name: "second".into(),
                    editor: EditorConfig::Renamer {
                        mappings: BTreeMap::from([("java/".to_string(), "src/".to_string())]),
                    },
                },
            ],
        };
        let (path, translator) = Translator::from_config(&config).unwrap();
        assert_eq!(path, TranslatorPath::new("internal", "public"));
        let names: Vec<_> = translator.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn invalid_editor_config_is_rejected() {
        let err = create_editor(&EditorConfig::Renamer {
            mappings: BTreeMap::new(),
        })
        .err()
        .unwrap();
        assert!(err.to_string().contains("at least one mapping"));
    }
}
