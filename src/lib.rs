// src/lib.rs

//! Conary Kitchen
//!
//! Runs declarative build recipes: fetch a tool's source (a checksummed
//! release archive or the head revision), run its configure/build/install
//! steps against an install prefix, then smoke-test the installed result.
//!
//! # Architecture
//!
//! - Recipes: TOML files, immutable once parsed
//! - Variants: Release (verified archive) or HeadSource (git, bootstrapped)
//! - Runs: strictly sequential, first failing step aborts, nothing retried
//! - Work directories: scoped temp dirs removed on every exit path

mod error;
pub mod hash;
pub mod recipe;

pub use error::{Error, Result};
pub use hash::{Checksum, HashAlgorithm};
pub use recipe::{
    BuildVariant, InstallResult, Recipe, RecipeRunner, RunnerConfig, ShellCommand, SourceTree,
};
