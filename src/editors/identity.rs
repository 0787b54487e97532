//! editors::identity

use crate::codebase::{Codebase, CodebaseError};
use crate::core::fs::{self, Lifetime};
use crate::expr::Options;
use crate::project::ProjectContext;

use super::Editor;

/// Copies a codebase without changing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEditor;

impl Editor for IdentityEditor {
    fn description(&self) -> String {
        "identity".to_string()
    }

    fn edit(
        &self,
        input: &Codebase,
        context: &ProjectContext,
        _options: &Options,
    ) -> Result<Codebase, CodebaseError> {
        let output = context
            .fs()
            .temporary_directory("identity_", Lifetime::CurrentTask)
            .map_err(|e| CodebaseError::io(context.fs().root(), e))?;
        fs::copy_dir(input.path(), &output).map_err(|e| CodebaseError::io(input.path(), e))?;

        Ok(Codebase::new(
            output,
            input.project_space(),
            input.expression().clone(),
        ))
    }
}
