//! create-codebase command - Evaluate an expression into a directory

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use super::{load_project, Context};
use crate::core::fs::{self, FileSystem};
use crate::expr::parse_expression;
use crate::ui::output;

/// Evaluate `expression` against the project in `config` and copy the
/// resulting files to `output_dir`.
pub fn create_codebase(
    ctx: &Context,
    config: &Path,
    output_dir: &Path,
    expression: &str,
) -> Result<()> {
    if output_dir.exists() && std::fs::read_dir(output_dir)?.next().is_some() {
        bail!("Output directory {} is not empty", output_dir.display());
    }

    let expr = parse_expression(expression)
        .with_context(|| format!("Invalid expression '{}'", expression))?;

    output::debug(format!("Evaluating {}", expr), ctx.verbosity);

    let scratch = Arc::new(FileSystem::new());
    let result = (|| -> Result<()> {
        let project = load_project(config, scratch.clone())?;
        let codebase = expr
            .create_codebase(&project)
            .with_context(|| format!("Could not create codebase {}", expr))?;

        fs::copy_dir(codebase.path(), output_dir)
            .with_context(|| format!("Failed to copy codebase to {}", output_dir.display()))?;

        output::success(
            format!(
                "Created codebase {} in project space \"{}\" at {}",
                codebase,
                codebase.project_space(),
                output_dir.display()
            ),
            ctx.verbosity,
        );
        Ok(())
    })();

    scratch.end_run();
    result
}
