// src/recipe/mod.rs

//! Recipe system for installing third-party tools from source
//!
//! Recipes define how to fetch, build, install and smoke-test a tool:
//! - The release archive and its checksum, or a head revision in git
//! - Ordered install steps (configure, make install, ...)
//! - Extra bootstrap steps for head builds
//! - Test steps run against the installed prefix
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "srmio"
//! version = "0.1.1~git1"
//! homepage = "http://www.zuto.de/project/srmio/"
//!
//! [source]
//! archive = "http://www.zuto.de/project/files/srmio/srmio-%(version)s.tar.gz"
//! checksum = "sha256:..."
//! head = { url = "https://github.com/rclasen/srmio.git" }
//!
//! [build]
//! steps = [
//!     ["./configure", "--disable-debug", "--disable-dependency-tracking", "--prefix=%(prefix)s"],
//!     ["make", "install"],
//! ]
//!
//! [head]
//! bootstrap = [["autoreconf", "-fi"]]
//!
//! [test]
//! steps = [["srmcmd", "--help"]]
//! ```

mod format;
pub mod parser;
pub mod runner;

pub use format::{
    BuildSection, BuildVariant, HeadSection, HeadSource, PackageSection, Recipe, ShellCommand,
    SourceSection, TestSection,
};
pub use parser::{check_variant, parse_recipe, parse_recipe_file, validate_recipe};
pub use runner::{BuildLog, InstallResult, RecipeRunner, RunnerConfig, SourceFetcher, SourceTree};
