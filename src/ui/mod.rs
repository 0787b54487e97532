//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity handling and console printing
//!
//! # Design
//!
//! Command handlers never call `println!` directly. Everything goes
//! through [`output`] so `--quiet` and `--debug` behave the same in
//! every subcommand.

pub mod output;
