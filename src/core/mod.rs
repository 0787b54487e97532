//! core
//!
//! Shared domain types, configuration and the file-system environment.
//!
//! # Modules
//!
//! - [`types`] - `Revision` and `RevisionMetadata`
//! - [`config`] - Project configuration schema and loading
//! - [`fs`] - Scratch directory allocation and lifetimes
//!
//! # Design Principles
//!
//! - Configuration is validated when it is constructed
//! - Shared services are explicit objects, never globals

pub mod config;
pub mod fs;
pub mod types;
