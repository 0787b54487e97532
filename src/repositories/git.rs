//! repositories::git
//!
//! Git repositories, reached through [`crate::git::Git`].
//!
//! # Working copies
//!
//! Revision history and the codebase creator only read, so they share one
//! clone per repository definition. It is made on first use and lives for
//! the run. Every writer clones afresh into a task-scoped directory, so no
//! two writers ever touch the same working tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::codebase::{Codebase, CodebaseCreator, CodebaseError};
use crate::core::config::{ConfigError, RepositoryConfig};
use crate::core::fs::{self, FileSystem, Lifetime};
use crate::core::types::{Revision, RevisionMetadata};
use crate::expr::Options;
use crate::git::{CommitAuthor, Git, GitError};

use super::{
    creation_expression, BackendError, DraftRevision, RepositoryFactory, RepositoryType,
    RevisionHistory, Writer, WriterCreator,
};

/// Builds `git` repositories.
pub struct GitRepositoryFactory {
    fs: Arc<FileSystem>,
}

impl GitRepositoryFactory {
    pub fn new(fs: Arc<FileSystem>) -> Self {
        Self { fs }
    }
}

impl RepositoryFactory for GitRepositoryFactory {
    fn kind(&self) -> &'static str {
        "git"
    }

    fn create(&self, name: &str, config: &RepositoryConfig) -> Result<RepositoryType, ConfigError> {
        let url = config.url().ok_or_else(|| {
            ConfigError::InvalidValue(format!("git repository '{}' requires a url", name))
        })?;

        let ignore = config
            .ignore_file_patterns()
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::InvalidValue(format!(
                        "invalid ignore_file_pattern '{}' in repository '{}': {}",
                        pattern, name, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let remote = Arc::new(GitRemote {
            name: name.to_string(),
            url: url.to_string(),
            branch: config.branch().map(str::to_string),
            fs: self.fs.clone(),
            shared: OnceCell::new(),
        });
        let ignore = Arc::new(ignore);

        Ok(RepositoryType {
            name: name.to_string(),
            revision_history: Arc::new(GitRevisionHistory {
                remote: remote.clone(),
            }),
            codebase_creator: Arc::new(GitCodebaseCreator {
                remote: remote.clone(),
                project_space: config.project_space().to_string(),
                ignore: ignore.clone(),
            }),
            writer_creator: Arc::new(GitWriterCreator {
                remote,
                project_space: config.project_space().to_string(),
                ignore,
            }),
        })
    }
}

/// Where a repository is cloned from, plus its shared read-only clone.
struct GitRemote {
    name: String,
    url: String,
    branch: Option<String>,
    fs: Arc<FileSystem>,
    shared: OnceCell<PathBuf>,
}

impl GitRemote {
    /// Open the shared clone, making it on first use.
    fn open_shared(&self) -> Result<Git, BackendError> {
        let path = self.shared.get_or_try_init(|| self.fresh_clone(Lifetime::Run))?;
        Ok(Git::open(path)?)
    }

    fn fresh_clone(&self, lifetime: Lifetime) -> Result<PathBuf, BackendError> {
        let dest = self
            .fs
            .temporary_directory(&format!("git_clone_{}_", self.name), lifetime)
            .map_err(|e| BackendError::io(self.fs.root(), e))?;
        Git::clone_from(&self.url, self.branch.as_deref(), &dest)?;
        tracing::debug!(repository = %self.name, path = %dest.display(), ?lifetime, "cloned git repository");
        Ok(dest)
    }

    /// Resolve `rev_id`, or the checked-out head, to a full commit id.
    fn resolve(&self, git: &Git, rev_id: Option<&str>) -> Result<String, BackendError> {
        let spec = rev_id.unwrap_or("HEAD");
        git.resolve(spec).map_err(|e| match e {
            GitError::RevisionNotFound { spec } => BackendError::UnknownRevision {
                repository: self.name.clone(),
                revision: spec,
            },
            other => other.into(),
        })
    }
}

struct GitRevisionHistory {
    remote: Arc<GitRemote>,
}

impl RevisionHistory for GitRevisionHistory {
    fn find_highest_revision(&self, rev_id: Option<&str>) -> Result<Revision, BackendError> {
        let git = self.remote.open_shared()?;
        let id = self.remote.resolve(&git, rev_id)?;
        Ok(Revision::new(id, &self.remote.name))
    }

    fn metadata(&self, revision: &Revision) -> Result<RevisionMetadata, BackendError> {
        let git = self.remote.open_shared()?;
        let id = self.remote.resolve(&git, Some(revision.rev_id()))?;
        let info = git.commit_info(&id)?;

        let author = if info.author_email.is_empty() {
            info.author_name
        } else {
            format!("{} <{}>", info.author_name, info.author_email)
        };

        Ok(RevisionMetadata {
            id: info.id,
            author,
            date: info.author_time,
            description: info.message,
            parents: info
                .parents
                .into_iter()
                .map(|p| Revision::new(p, &self.remote.name))
                .collect(),
        })
    }
}

struct GitCodebaseCreator {
    remote: Arc<GitRemote>,
    project_space: String,
    ignore: Arc<Vec<Regex>>,
}

impl CodebaseCreator for GitCodebaseCreator {
    fn create(&self, options: &Options) -> Result<Codebase, CodebaseError> {
        let unknown: Vec<&str> = options
            .keys()
            .map(String::as_str)
            .filter(|k| *k != "revision")
            .collect();
        if !unknown.is_empty() {
            return Err(BackendError::InvalidOptions(format!(
                "git repository '{}' only accepts the 'revision' option, got [{}]",
                self.remote.name,
                unknown.join(", ")
            ))
            .into());
        }

        let git = self.remote.open_shared()?;
        let id = self
            .remote
            .resolve(&git, options.get("revision").map(String::as_str))?;

        let fs = &self.remote.fs;
        let export = fs
            .temporary_directory(
                &format!("git_export_{}_{}_", self.remote.name, id),
                Lifetime::CurrentTask,
            )
            .map_err(|e| CodebaseError::io(fs.root(), e))?;
        git.export_tree(&id, &export).map_err(BackendError::from)?;
        remove_ignored(&export, &self.ignore).map_err(|e| CodebaseError::io(&export, e))?;

        tracing::debug!(
            repository = %self.remote.name,
            revision = %id,
            path = %export.display(),
            "exported git codebase"
        );

        let mut resolved = Options::new();
        resolved.insert("revision".to_string(), id);
        Ok(Codebase::new(
            export,
            &self.project_space,
            creation_expression(&self.remote.name, &resolved)?,
        ))
    }
}

/// Delete every file whose relative path matches an ignore pattern.
fn remove_ignored(root: &Path, ignore: &[Regex]) -> std::io::Result<()> {
    if ignore.is_empty() {
        return Ok(());
    }
    for file in fs::find_files(root, &[])? {
        if is_ignored(&file, ignore) {
            std::fs::remove_file(root.join(&file))?;
        }
    }
    Ok(())
}

fn is_ignored(relative: &str, ignore: &[Regex]) -> bool {
    ignore.iter().any(|re| re.is_match(relative))
}

struct GitWriterCreator {
    remote: Arc<GitRemote>,
    project_space: String,
    ignore: Arc<Vec<Regex>>,
}

impl WriterCreator for GitWriterCreator {
    fn create(&self, _options: &Options) -> Result<Box<dyn Writer>, BackendError> {
        let root = self.remote.fresh_clone(Lifetime::CurrentTask)?;
        Ok(Box::new(GitWriter {
            root,
            project_space: self.project_space.clone(),
            ignore: self.ignore.clone(),
        }))
    }
}

struct GitWriter {
    root: PathBuf,
    project_space: String,
    ignore: Arc<Vec<Regex>>,
}

impl GitWriter {
    /// Make the working tree hold exactly the codebase's files.
    ///
    /// `.git` and files matching the ignore patterns are left alone, unless
    /// an incoming file needs the path of a directory holding them.
    fn mirror(&self, codebase: &Codebase) -> Result<(), BackendError> {
        let incoming: BTreeSet<String> = codebase
            .relative_filenames()
            .map_err(|e| match e {
                CodebaseError::Io { path, source } => BackendError::Io { path, source },
                other => BackendError::InvalidOptions(other.to_string()),
            })?
            .into_iter()
            .collect();

        let existing = fs::find_files(&self.root, &[".git"])
            .map_err(|e| BackendError::io(&self.root, e))?;
        for file in existing {
            if !incoming.contains(&file) && !is_ignored(&file, &self.ignore) {
                let path = self.root.join(&file);
                std::fs::remove_file(&path).map_err(|e| BackendError::io(&path, e))?;
            }
        }
        fs::prune_empty_dirs(&self.root, &[".git"])
            .map_err(|e| BackendError::io(&self.root, e))?;

        for file in &incoming {
            let target = self.root.join(file);
            // A directory left here holds only ignored files.
            if target.is_dir() {
                std::fs::remove_dir_all(&target).map_err(|e| BackendError::io(&target, e))?;
            }
            fs::copy_dir(&codebase.file(file), &target)
                .map_err(|e| BackendError::io(&target, e))?;
        }
        Ok(())
    }
}

impl Writer for GitWriter {
    fn root(&self) -> &Path {
        &self.root
    }

    fn put_codebase(
        &mut self,
        codebase: &Codebase,
        metadata: Option<&RevisionMetadata>,
    ) -> Result<DraftRevision, BackendError> {
        codebase.check_project_space(&self.project_space)?;
        self.mirror(codebase)?;

        let git = Git::open(&self.root)?;
        git.stage_all()?;

        if let Some(metadata) = metadata {
            let (name, email) = split_author(&metadata.author);
            let id = git.commit(
                &metadata.description,
                &CommitAuthor {
                    name: name.to_string(),
                    email: email.to_string(),
                    time: metadata.date,
                },
            )?;
            tracing::info!(commit = %id, root = %self.root.display(), "committed codebase");
        }

        Ok(DraftRevision::new(&self.root))
    }
}

/// Split `Name <email>` into its parts. Anything else is all name.
fn split_author(author: &str) -> (&str, &str) {
    match author.rsplit_once('<') {
        Some((name, rest)) if rest.ends_with('>') => {
            (name.trim(), rest.trim_end_matches('>').trim())
        }
        _ => (author.trim(), ""),
    }
}
