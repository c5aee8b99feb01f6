// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::CookOptions;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            recipe,
            prefix,
            head,
            keep_workdir,
            source_cache,
            work_root,
            timeout,
            skip_test,
        } => commands::cmd_cook(
            &recipe,
            CookOptions {
                prefix,
                head,
                keep_workdir,
                source_cache,
                work_root,
                timeout_secs: timeout,
                skip_test,
            },
        ),
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Fetch {
            recipe,
            source_cache,
        } => commands::cmd_fetch(&recipe, &source_cache),
        Commands::Test {
            recipe,
            prefix,
            timeout,
        } => commands::cmd_test(&recipe, &prefix, timeout),
    }
}
