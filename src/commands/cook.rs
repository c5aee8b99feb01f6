// src/commands/cook.rs

//! Cook command - build, install and test tools from recipes

use anyhow::{Context, Result};
use conary_kitchen::recipe::{
    parse_recipe_file, validate_recipe, BuildVariant, Recipe, RecipeRunner, RunnerConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Options for `kitchen cook`
#[derive(Debug, Clone)]
pub struct CookOptions {
    pub prefix: String,
    pub head: bool,
    pub keep_workdir: bool,
    pub source_cache: Option<String>,
    pub work_root: Option<String>,
    pub timeout_secs: u64,
    pub skip_test: bool,
}

/// Cook a recipe into an install prefix
pub fn cmd_cook(recipe_path: &str, opts: CookOptions) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;

    let variant = if opts.head {
        BuildVariant::HeadSource
    } else {
        BuildVariant::Release
    };

    let config = RunnerConfig {
        source_cache: opts.source_cache.map(PathBuf::from),
        work_root: opts.work_root.map(PathBuf::from),
        step_timeout: Duration::from_secs(opts.timeout_secs),
        keep_workdir: opts.keep_workdir,
        skip_test: opts.skip_test,
        ..Default::default()
    };
    let runner = RecipeRunner::new(config);

    if variant == BuildVariant::Release && runner.source_cached(&recipe) {
        println!("  - Source archive already cached");
    }
    println!(
        "Cooking {} {} ({}) into {}",
        recipe.package.name, recipe.package.version, variant, opts.prefix
    );

    let result = runner
        .install(&recipe, variant, Path::new(&opts.prefix))
        .with_context(|| format!("Failed to cook {}", recipe.package.name))?;

    println!("\n[COMPLETE] Installed into {}", result.prefix.display());
    println!("  - {} step(s) run", result.log.steps_run());
    if !result.tested {
        println!("  - Smoke test skipped");
    }
    if let Some(workdir) = &result.workdir {
        println!("  - Work directory kept at {}", workdir.display());
    }

    info!(
        "Successfully cooked {} into {}",
        recipe.package.name,
        result.prefix.display()
    );
    Ok(())
}

/// Validate a recipe and report warnings
pub fn cmd_validate(recipe_path: &str) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;

    println!("Recipe validation passed");
    if recipe.supports_head() {
        println!("  - Head builds supported");
    }
    Ok(())
}

/// Fetch and verify the release archive into the source cache
pub fn cmd_fetch(recipe_path: &str, source_cache: &str) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;

    let runner = RecipeRunner::new(RunnerConfig {
        source_cache: Some(PathBuf::from(source_cache)),
        ..Default::default()
    });

    let path = runner
        .fetch(&recipe)
        .with_context(|| format!("Failed to fetch sources for {}", recipe.package.name))?;

    println!("\n[COMPLETE] Fetched: {}", path.display());
    Ok(())
}

/// Run only the smoke test against an existing installation
pub fn cmd_test(recipe_path: &str, prefix: &str, timeout_secs: u64) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;

    let runner = RecipeRunner::new(RunnerConfig {
        step_timeout: Duration::from_secs(timeout_secs),
        ..Default::default()
    });

    let prefix = std::path::absolute(prefix)
        .with_context(|| format!("Invalid prefix: {}", prefix))?;
    let log = runner
        .run_test(&recipe, &prefix)
        .with_context(|| format!("Smoke test failed for {}", recipe.package.name))?;

    println!("[OK] {} test step(s) passed", log.steps_run());
    Ok(())
}

/// Parse and validate a recipe file, printing any warnings
fn load_recipe(recipe_path: &Path) -> Result<Recipe> {
    println!("Reading recipe: {}", recipe_path.display());
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    println!("Recipe: {} version {}", recipe.package.name, recipe.package.version);

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    Ok(recipe)
}
