// tests/reference_recipe.rs

//! The shipped srmio recipe parses, validates and expands as expected.

use conary_kitchen::recipe::{check_variant, parse_recipe_file, validate_recipe};
use conary_kitchen::{BuildVariant, Error, Recipe};
use std::path::Path;

fn srmio() -> Recipe {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("recipes/srmio.toml");
    parse_recipe_file(&path).unwrap()
}

fn expanded(recipe: &Recipe, variant: BuildVariant, prefix: &str) -> Vec<String> {
    recipe
        .install_steps(variant)
        .into_iter()
        .map(|step| recipe.substitute_command(step, prefix).to_string())
        .collect()
}

#[test]
fn test_srmio_validates_with_checksum_warning() {
    let recipe = srmio();
    let warnings = validate_recipe(&recipe).unwrap();

    assert!(warnings.iter().any(|w| w.contains("checksum")));
    assert!(recipe.supports_head());
}

#[test]
fn test_srmio_release_steps() {
    let recipe = srmio();
    assert_eq!(
        expanded(&recipe, BuildVariant::Release, "/opt/srmio"),
        [
            "./configure --disable-debug --disable-dependency-tracking --prefix=/opt/srmio",
            "make install",
        ]
    );
    assert_eq!(
        recipe.archive_url(),
        "http://www.zuto.de/project/files/srmio/srmio-0.1.1~git1.tar.gz"
    );
}

#[test]
fn test_srmio_head_steps_bootstrap_first() {
    let recipe = srmio();
    assert_eq!(
        expanded(&recipe, BuildVariant::HeadSource, "/opt/srmio"),
        [
            "sh genautomake.sh",
            "./configure --disable-dependency-tracking --prefix=/opt/srmio",
            "make install",
        ]
    );
}

#[test]
fn test_srmio_release_needs_published_checksum() {
    let recipe = srmio();
    assert!(matches!(
        check_variant(&recipe, BuildVariant::Release),
        Err(Error::InvalidRecipe(_))
    ));
    assert!(check_variant(&recipe, BuildVariant::HeadSource).is_ok());
}
