//! ui::output
//!
//! Console output for the `moe` binary.
//!
//! # Design
//!
//! Query results go to stdout so they can be piped; warnings, errors and
//! debug chatter go to stderr. `--quiet` silences everything except errors.

use std::fmt::Display;

/// How much the CLI says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Results and warnings
    #[default]
    Normal,
    /// Everything, including evaluation steps
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    fn shows_results(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Print a result line to stdout.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_results() {
        println!("{}", message);
    }
}

/// Print an evaluation step to stderr (debug only).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error to stderr. Never silenced.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning to stderr.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_results() {
        eprintln!("warning: {}", message);
    }
}

/// Print the outcome of a command that changed something.
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_results() {
        println!("{}", message);
    }
}

/// One item per line, each behind `prefix`.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_beats_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn format_list_prefixes_each_line() {
        let items = ["a{1}", "a{2}"];
        assert_eq!(format_list(&items, "  "), "  a{1}\n  a{2}");
        assert_eq!(format_list::<&str>(&[], "  "), "");
    }
}
