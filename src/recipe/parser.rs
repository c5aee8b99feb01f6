// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::hash::Checksum;
use crate::recipe::format::{BuildVariant, Recipe};
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::Parse(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)?;
    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors are returned as `Err`; softer problems come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::InvalidRecipe("package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::InvalidRecipe("package version cannot be empty".to_string()));
    }
    if recipe.package.homepage.is_empty() {
        return Err(Error::InvalidRecipe("homepage cannot be empty".to_string()));
    }
    if recipe.source.archive.is_empty() {
        return Err(Error::InvalidRecipe("source archive URL cannot be empty".to_string()));
    }
    if recipe.build.steps.is_empty() {
        return Err(Error::InvalidRecipe("build.steps must list at least one step".to_string()));
    }

    if recipe.source.head.is_some() {
        match &recipe.head {
            Some(head) if !head.bootstrap.is_empty() => {
                if head.steps.as_ref().is_some_and(Vec::is_empty) {
                    return Err(Error::InvalidRecipe(
                        "head.steps must list at least one step when set".to_string(),
                    ));
                }
            }
            _ => {
                return Err(Error::InvalidRecipe(
                    "source.head requires at least one [head] bootstrap step".to_string(),
                ));
            }
        }
    }

    match &recipe.source.checksum {
        Some(checksum) => {
            Checksum::parse_prefixed(checksum).map_err(|e| {
                Error::InvalidRecipe(format!("invalid checksum {}: {}", checksum, e))
            })?;
        }
        None => warnings.push("No source checksum; only head builds are possible".to_string()),
    }

    if recipe.head.is_some() && recipe.source.head.is_none() {
        warnings.push("[head] section present but source.head is not set".to_string());
    }
    if recipe.test.steps.is_empty() {
        warnings.push("No test steps specified".to_string());
    }
    if recipe.package.summary.is_none() {
        warnings.push("Missing package summary".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }

    Ok(warnings)
}

/// Check that a recipe carries what the requested variant needs
///
/// Release needs a checksum and build steps. HeadSource needs a head
/// source, at least one bootstrap step, and configure/install steps to
/// follow it.
pub fn check_variant(recipe: &Recipe, variant: BuildVariant) -> Result<()> {
    let name = &recipe.package.name;

    match variant {
        BuildVariant::Release => {
            if recipe.source.checksum.is_none() {
                return Err(Error::InvalidRecipe(format!(
                    "{} has no checksum; release builds must be verified",
                    name
                )));
            }
            if recipe.build.steps.is_empty() {
                return Err(Error::InvalidRecipe(format!("{} has no build steps", name)));
            }
        }
        BuildVariant::HeadSource => {
            if recipe.source.head.is_none() {
                return Err(Error::InvalidRecipe(format!(
                    "{} does not declare a head source",
                    name
                )));
            }
            let Some(head) = recipe.head.as_ref().filter(|h| !h.bootstrap.is_empty()) else {
                return Err(Error::InvalidRecipe(format!(
                    "{} has no [head] bootstrap step to run before configure",
                    name
                )));
            };
            if head.steps.as_ref().unwrap_or(&recipe.build.steps).is_empty() {
                return Err(Error::InvalidRecipe(format!(
                    "{} has no build steps for head builds",
                    name
                )));
            }
        }
    }

    Ok(())
}
