//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the project config and/or ledger it needs
//! 2. Calls into the library
//! 3. Formats and displays output through [`crate::ui::output`]
//!
//! Scratch directories allocated while a command runs are removed before
//! it returns.

mod completion;
mod create_codebase;
mod equivalence;
mod last_equivalence;
mod parse;

pub use completion::completion;
pub use create_codebase::create_codebase;
pub use equivalence::{find_equivalences, note_equivalence};
pub use last_equivalence::last_equivalence;
pub use parse::parse;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::ProjectConfig;
use crate::core::fs::FileSystem;
use crate::project::ProjectContext;
use crate::repositories::Repositories;
use crate::ui::output::Verbosity;

/// Settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub verbosity: Verbosity,
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Parse { expression } => parse::parse(ctx, &expression),
        Command::CreateCodebase {
            config,
            output,
            expression,
        } => create_codebase::create_codebase(ctx, &config, &output, &expression),
        Command::NoteEquivalence { db, first, second } => {
            equivalence::note_equivalence(ctx, &db, &first, &second)
        }
        Command::FindEquivalences {
            db,
            revision,
            in_repository,
        } => equivalence::find_equivalences(ctx, &db, &revision, &in_repository),
        Command::LastEquivalence {
            config,
            db,
            from,
            to,
            revision,
            branched,
        } => last_equivalence::last_equivalence(
            ctx,
            &config,
            &db,
            &from,
            &to,
            revision.as_deref(),
            branched,
        ),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load `config_path` and wire up its project with the built-in backends.
fn load_project(config_path: &Path, fs: Arc<FileSystem>) -> Result<ProjectContext> {
    let config = ProjectConfig::load(config_path)
        .with_context(|| format!("Failed to load project config {}", config_path.display()))?;
    let repositories = Repositories::defaults(fs.clone());
    ProjectContext::from_config(&config, &repositories, fs)
        .with_context(|| format!("Invalid project '{}'", config.name()))
}
