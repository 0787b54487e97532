//! editors::renamer
//!
//! Moves files from one path prefix to another.
//!
//! Each file is renamed by the longest mapping key that is a whole-segment
//! prefix of its relative path: `lib` matches `lib/x.c` but not
//! `library.c`. Files that match no key keep their path.

use std::collections::BTreeMap;

use crate::codebase::{Codebase, CodebaseError};
use crate::core::fs::{self, Lifetime};
use crate::expr::Options;
use crate::project::ProjectContext;

use super::Editor;

/// Renames files by path prefix.
#[derive(Debug, Clone)]
pub struct RenamingEditor {
    mappings: BTreeMap<String, String>,
}

impl RenamingEditor {
    pub fn new(mappings: BTreeMap<String, String>) -> Self {
        Self { mappings }
    }

    /// The new relative path for `relative`.
    pub fn rename(&self, relative: &str) -> String {
        let best = self
            .mappings
            .iter()
            .filter(|(from, _)| is_path_prefix(from, relative))
            .max_by_key(|(from, _)| from.len());

        match best {
            Some((from, to)) => {
                let renamed = format!("{}{}", to, &relative[from.len()..]);
                renamed.trim_start_matches('/').to_string()
            }
            None => relative.to_string(),
        }
    }
}

fn is_path_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl Editor for RenamingEditor {
    fn description(&self) -> String {
        format!("renamer ({} mappings)", self.mappings.len())
    }

    fn edit(
        &self,
        input: &Codebase,
        context: &ProjectContext,
        _options: &Options,
    ) -> Result<Codebase, CodebaseError> {
        let output = context
            .fs()
            .temporary_directory("renamer_", Lifetime::CurrentTask)
            .map_err(|e| CodebaseError::io(context.fs().root(), e))?;

        let mut placed: BTreeMap<String, String> = BTreeMap::new();
        for file in input.relative_filenames()? {
            let renamed = self.rename(&file);
            if renamed.is_empty() {
                return Err(CodebaseError::Creation(format!(
                    "renamer: '{}' would be renamed to the codebase root",
                    file
                )));
            }
            if let Some(previous) = placed.get(&renamed) {
                return Err(CodebaseError::Creation(format!(
                    "renamer: both '{}' and '{}' map to '{}'",
                    previous, file, renamed
                )));
            }

            let target = output.join(&renamed);
            fs::copy_dir(&input.file(&file), &target).map_err(|e| CodebaseError::io(&target, e))?;
            placed.insert(renamed, file);
        }

        Ok(Codebase::new(
            output,
            input.project_space(),
            input.expression().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::FileSystem;
    use crate::expr::{Expression, Term};
    use tempfile::TempDir;

    fn renamer(pairs: &[(&str, &str)]) -> RenamingEditor {
        RenamingEditor::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn longest_prefix_wins() {
        let r = renamer(&[("java/", "src/"), ("java/com/internal/", "src/public/")]);
        assert_eq!(r.rename("java/com/internal/A.java"), "src/public/A.java");
        assert_eq!(r.rename("java/com/other/B.java"), "src/com/other/B.java");
        assert_eq!(r.rename("README"), "README");
    }

    #[test]
    fn mapping_to_root_strips_leading_slash() {
        let r = renamer(&[("third_party/lib", "")]);
        assert_eq!(r.rename("third_party/lib/x.c"), "x.c");
    }

    #[test]
    fn prefixes_match_whole_path_segments() {
        let r = renamer(&[("third_party/lib", ""), ("docs", "manual")]);
        assert_eq!(r.rename("third_party/library.c"), "third_party/library.c");
        assert_eq!(r.rename("third_party/lib/sub/y.c"), "sub/y.c");
        assert_eq!(r.rename("docs"), "manual");
        assert_eq!(r.rename("docs/index.md"), "manual/index.md");
        assert_eq!(r.rename("docsite/index.md"), "docsite/index.md");
    }

    #[test]
    fn renaming_a_file_to_the_root_fails() {
        let scratch = TempDir::new().unwrap();
        let context = ProjectContext::builder()
            .file_system(FileSystem::with_root(scratch.path()))
            .build();

        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join("LICENSE"), "mit").unwrap();
        let input = Codebase::new(
            source.path(),
            "internal",
            Expression::repository(Term::new("foo").unwrap()),
        );

        let err = renamer(&[("LICENSE", "")])
            .edit(&input, &context, &Options::new())
            .unwrap_err();
        assert!(matches!(err, CodebaseError::Creation(_)));
        assert_eq!(
            err.to_string(),
            "renamer: 'LICENSE' would be renamed to the codebase root"
        );
    }

    #[test]
    fn edit_moves_files() {
        let scratch = TempDir::new().unwrap();
        let context = ProjectContext::builder()
            .file_system(FileSystem::with_root(scratch.path()))
            .build();

        let source = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("java/pkg")).unwrap();
        std::fs::write(source.path().join("java/pkg/A.java"), "class A {}").unwrap();
        std::fs::write(source.path().join("BUILD"), "").unwrap();
        let input = Codebase::new(
            source.path(),
            "internal",
            Expression::repository(Term::new("foo").unwrap()),
        );

        let output = renamer(&[("java/", "src/main/java/")])
            .edit(&input, &context, &Options::new())
            .unwrap();
        assert_eq!(
            output.relative_filenames().unwrap(),
            vec!["BUILD", "src/main/java/pkg/A.java"]
        );
        assert_eq!(output.project_space(), "internal");
    }

    #[test]
    fn collisions_fail() {
        let scratch = TempDir::new().unwrap();
        let context = ProjectContext::builder()
            .file_system(FileSystem::with_root(scratch.path()))
            .build();

        let source = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("a")).unwrap();
        std::fs::create_dir_all(source.path().join("b")).unwrap();
        std::fs::write(source.path().join("a/x"), "1").unwrap();
        std::fs::write(source.path().join("b/x"), "2").unwrap();
        let input = Codebase::new(
            source.path(),
            "internal",
            Expression::repository(Term::new("foo").unwrap()),
        );

        let err = renamer(&[("a/", "c/"), ("b/", "c/")])
            .edit(&input, &context, &Options::new())
            .unwrap_err();
        assert!(err.to_string().contains("map to 'c/x'"));
    }
}
