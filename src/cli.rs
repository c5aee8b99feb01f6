// src/cli.rs
//! CLI definitions for the kitchen recipe runner
//!
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kitchen")]
#[command(author = "Conary Contributors")]
#[command(version)]
#[command(about = "Fetch, build, install and smoke-test tools from declarative recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a recipe, install it into a prefix and run its smoke test
    Cook {
        /// Path to the recipe file
        recipe: String,

        /// Installation prefix
        #[arg(short, long)]
        prefix: String,

        /// Build from the head revision instead of the release archive
        #[arg(long)]
        head: bool,

        /// Keep the work directory after a successful install
        #[arg(long)]
        keep_workdir: bool,

        /// Directory for caching verified source archives
        #[arg(long)]
        source_cache: Option<String>,

        /// Parent directory for temporary work directories
        #[arg(long)]
        work_root: Option<String>,

        /// Timeout for each build or test step, in seconds
        #[arg(long, default_value = "3600", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,

        /// Skip the post-install smoke test
        #[arg(long)]
        skip_test: bool,
    },

    /// Validate a recipe without building it
    Validate {
        /// Path to the recipe file
        recipe: String,
    },

    /// Download and verify the release archive without building
    Fetch {
        /// Path to the recipe file
        recipe: String,

        /// Directory for caching verified source archives
        #[arg(long, default_value = "/var/cache/conary/sources")]
        source_cache: String,
    },

    /// Run only the smoke test against an existing installation
    Test {
        /// Path to the recipe file
        recipe: String,

        /// Installation prefix
        #[arg(short, long)]
        prefix: String,

        /// Timeout for each test step, in seconds
        #[arg(long, default_value = "3600", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
    },
}
