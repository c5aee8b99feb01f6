// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe file
fn recipe_arg() -> Arg {
    Arg::new("recipe").required(true).help("Path to the recipe file")
}

/// Common argument: install prefix
fn prefix_arg() -> Arg {
    Arg::new("prefix")
        .short('p')
        .long("prefix")
        .value_name("DIR")
        .required(true)
        .help("Installation prefix")
}

/// Common argument: per-step timeout
fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("SECS")
        .default_value("3600")
        .value_parser(clap::value_parser!(u64).range(1..))
        .help("Timeout for each build or test step, in seconds")
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("kitchen")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Conary Contributors")
        .about("Fetch, build, install and smoke-test tools from declarative recipes")
        .subcommand_required(true)
        .subcommand(
            Command::new("cook")
                .about("Build a recipe, install it into a prefix and run its smoke test")
                .arg(recipe_arg())
                .arg(prefix_arg())
                .arg(flag("head", "Build from the head revision instead of the release archive"))
                .arg(flag("keep-workdir", "Keep the work directory after a successful install"))
                .arg(
                    Arg::new("source-cache")
                        .long("source-cache")
                        .value_name("DIR")
                        .help("Directory for caching verified source archives"),
                )
                .arg(
                    Arg::new("work-root")
                        .long("work-root")
                        .value_name("DIR")
                        .help("Parent directory for temporary work directories"),
                )
                .arg(timeout_arg())
                .arg(flag("skip-test", "Skip the post-install smoke test")),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a recipe without building it")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download and verify the release archive without building")
                .arg(recipe_arg())
                .arg(
                    Arg::new("source-cache")
                        .long("source-cache")
                        .value_name("DIR")
                        .default_value("/var/cache/conary/sources")
                        .help("Directory for caching verified source archives"),
                ),
        )
        .subcommand(
            Command::new("test")
                .about("Run only the smoke test against an existing installation")
                .arg(recipe_arg())
                .arg(prefix_arg())
                .arg(timeout_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    if let Err(e) = fs::write(man_dir.join("kitchen.1"), buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
