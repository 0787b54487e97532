//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// moe - migrate code between repositories in different project spaces
#[derive(Parser, Debug)]
#[command(name = "moe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a codebase expression and show its steps
    #[command(after_help = "\
EXAMPLES:
    moe parse 'internal(revision=45)>public|renamer'
    moe parse 'file(path=\"/tmp/my src\")'")]
    Parse {
        /// The expression to parse
        expression: String,
    },

    /// Evaluate a codebase expression and copy the result to a directory
    #[command(
        name = "create-codebase",
        after_help = "\
EXAMPLES:
    # Export public head, translated and renamed
    moe create-codebase --config moe.json --output /tmp/out 'internal>public|relocate'"
    )]
    CreateCodebase {
        /// Project config file (JSON, or TOML when ending in .toml)
        #[arg(long)]
        config: PathBuf,

        /// Directory to copy the codebase into
        #[arg(long)]
        output: PathBuf,

        /// The expression to evaluate
        expression: String,
    },

    /// Record that two revisions hold the same content
    #[command(name = "note-equivalence")]
    NoteEquivalence {
        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// First revision, as repository{id}
        first: String,

        /// Second revision, as repository{id}
        second: String,
    },

    /// List revisions in another repository equivalent to a revision
    #[command(name = "find-equivalences")]
    FindEquivalences {
        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// The revision to look up, as repository{id}
        #[arg(long)]
        revision: String,

        /// The repository to find equivalents in
        #[arg(long = "in", value_name = "REPOSITORY")]
        in_repository: String,
    },

    /// Find the last equivalence and the revisions migrated since
    #[command(
        name = "last-equivalence",
        after_help = "\
EXAMPLES:
    # What in internal has not reached public yet?
    moe last-equivalence --config moe.json --db moe_db.json --from internal --to public

    # Follow merge parents too
    moe last-equivalence --config moe.json --db moe_db.json --from internal --to public --branched"
    )]
    LastEquivalence {
        /// Project config file
        #[arg(long)]
        config: PathBuf,

        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// Repository to walk back through
        #[arg(long)]
        from: String,

        /// Repository the equivalences point into
        #[arg(long)]
        to: String,

        /// Revision to start from (default: head)
        #[arg(long)]
        revision: Option<String>,

        /// Follow every parent of merges, not only the first
        #[arg(long)]
        branched: bool,
    },

    /// Generate shell completion scripts
    #[command(after_help = "\
INSTALLATION:
    # Bash (add to ~/.bashrc)
    source <(moe completion bash)

    # Zsh (add to ~/.zshrc)
    source <(moe completion zsh)

    # Fish
    moe completion fish > ~/.config/fish/completions/moe.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_last_equivalence() {
        let cli = Cli::try_parse_from([
            "moe",
            "last-equivalence",
            "--config",
            "moe.json",
            "--db",
            "db.json",
            "--from",
            "internal",
            "--to",
            "public",
            "--branched",
        ])
        .unwrap();
        match cli.command {
            Command::LastEquivalence {
                from,
                to,
                revision,
                branched,
                ..
            } => {
                assert_eq!(from, "internal");
                assert_eq!(to, "public");
                assert_eq!(revision, None);
                assert!(branched);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["moe", "parse", "foo", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }
}
