// src/recipe/runner/mod.rs

//! RecipeRunner: fetch, verify, build, install and smoke-test a recipe
//!
//! A run is strictly sequential:
//! 1. **Resolve**: fetch the release archive and verify its checksum, or
//!    check out the head revision, into a scoped work directory
//! 2. **Build**: run the install steps in order inside the source tree
//! 3. **Test**: run the smoke-test steps against the installed prefix
//!
//! The first failing step aborts the run. Nothing is retried.

mod archive;
mod config;
mod fetch;
mod step;
mod workdir;

pub use archive::{extract_archive, locate_source_root, verify_archive};
pub use config::{BuildLog, InstallResult, RunnerConfig};
pub use fetch::{DefaultFetcher, SourceFetcher};
pub use step::{StepExecutor, StepOutput};
pub use workdir::SourceTree;

use crate::error::{Error, Result};
use crate::hash::Checksum;
use crate::recipe::format::{BuildVariant, Recipe, ShellCommand};
use crate::recipe::parser::check_variant;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs recipes against an install prefix
pub struct RecipeRunner {
    pub(crate) config: RunnerConfig,
    fetcher: Arc<dyn SourceFetcher>,
}

impl RecipeRunner {
    /// Create a runner using the default fetcher
    pub fn new(config: RunnerConfig) -> Self {
        let fetcher = Arc::new(DefaultFetcher::new(config.http_timeout));
        Self { config, fetcher }
    }

    /// Create a runner with a custom source fetcher
    pub fn with_fetcher(config: RunnerConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Create a runner with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RunnerConfig::default())
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Install a recipe into `install_prefix`: resolve, build, then test
    ///
    /// The work directory is removed on every exit path unless the run
    /// succeeds and `keep_workdir` is set.
    pub fn install(
        &self,
        recipe: &Recipe,
        variant: BuildVariant,
        install_prefix: &Path,
    ) -> Result<InstallResult> {
        info!(
            "Installing {} {} ({}) into {}",
            recipe.package.name,
            recipe.package.version,
            variant,
            install_prefix.display()
        );

        fs::create_dir_all(install_prefix)?;
        let prefix = std::path::absolute(install_prefix)?;

        let tree = self.resolve_source(recipe, variant)?;
        let mut log = self.build(recipe, variant, &tree, &prefix)?;

        let tested = if self.config.skip_test {
            info!("Skipping smoke test");
            false
        } else {
            log.append(self.run_test(recipe, &prefix)?);
            true
        };

        let workdir = if self.config.keep_workdir {
            let kept = tree.keep();
            info!("Keeping work directory: {}", kept.display());
            Some(kept)
        } else {
            None
        };

        Ok(InstallResult {
            prefix,
            log,
            workdir,
            tested,
        })
    }

    /// Obtain the source for a variant in a fresh work directory
    ///
    /// Release archives are verified byte-for-byte against the declared
    /// checksum; head checkouts are not checksummed.
    pub fn resolve_source(&self, recipe: &Recipe, variant: BuildVariant) -> Result<SourceTree> {
        check_variant(recipe, variant)?;
        let mut tree = SourceTree::create(self.config.work_root.as_deref(), variant)?;

        match variant {
            BuildVariant::Release => {
                let expected = declared_checksum(recipe)?;
                let archive = tree.downloads_dir().join(recipe.archive_filename());
                self.obtain_archive(&recipe.archive_url(), &expected, &archive)?;

                info!("Unpacking {}", recipe.archive_filename());
                extract_archive(&archive, &tree.unpack_dir())?;
                let source_dir =
                    locate_source_root(&tree.unpack_dir(), recipe.source.extract_dir.as_deref())?;
                tree.set_source_dir(source_dir);
            }
            BuildVariant::HeadSource => {
                let head = recipe.source.head.as_ref().ok_or_else(|| {
                    Error::InvalidRecipe(format!("{} has no head source", recipe.package.name))
                })?;
                let dest = tree.unpack_dir().join(&recipe.package.name);
                self.fetcher.checkout(head, &dest)?;
                tree.set_source_dir(dest);
            }
        }

        Ok(tree)
    }

    /// Run the variant's install steps in order inside the source tree
    ///
    /// Stops at the first step exiting non-zero with [`Error::BuildStep`].
    pub fn build(
        &self,
        recipe: &Recipe,
        variant: BuildVariant,
        tree: &SourceTree,
        install_prefix: &Path,
    ) -> Result<BuildLog> {
        let prefix = install_prefix.to_string_lossy();
        let steps = recipe.install_steps(variant);
        if steps.is_empty() {
            return Err(Error::InvalidRecipe(format!(
                "{} has no {} build steps",
                recipe.package.name, variant
            )));
        }

        let workdir = match &recipe.build.workdir {
            Some(wd) => tree.source_dir().join(wd),
            None => tree.source_dir().to_path_buf(),
        };

        let mut executor =
            StepExecutor::new(&workdir, self.config.step_timeout).env("PREFIX", prefix.to_string());
        for (key, value) in &recipe.build.environment {
            executor = executor.env(key.as_str(), recipe.substitute(value, &prefix));
        }

        let mut log = BuildLog::new();
        for (index, step) in steps.iter().enumerate() {
            let command = recipe.substitute_command(step, &prefix);
            info!("Build step {}/{}: {}", index + 1, steps.len(), command);

            let output = run_step(&executor, &command)?;
            log.step(&command.to_string(), &output.stdout, &output.stderr);

            if !output.success() {
                return Err(Error::BuildStep {
                    step_index: index,
                    exit_code: output.exit_code,
                    command: command.to_string(),
                });
            }
        }

        info!("Built {} in {} step(s)", recipe.package.name, steps.len());
        Ok(log)
    }

    /// Run the smoke-test steps against the installed prefix
    ///
    /// `<prefix>/bin` is put first on `PATH` so tests can call the
    /// installed tool by name.
    pub fn run_test(&self, recipe: &Recipe, install_prefix: &Path) -> Result<BuildLog> {
        let prefix = install_prefix.to_string_lossy();
        let mut log = BuildLog::new();

        if recipe.test.steps.is_empty() {
            warn!("{} declares no test steps", recipe.package.name);
            return Ok(log);
        }

        let executor = StepExecutor::new(install_prefix, self.config.step_timeout)
            .env("PREFIX", prefix.to_string())
            .env("PATH", test_path(install_prefix));

        for (index, step) in recipe.test.steps.iter().enumerate() {
            let command = recipe.substitute_command(step, &prefix);
            info!("Test step {}/{}: {}", index + 1, recipe.test.steps.len(), command);

            let output = run_step(&executor, &command)?;
            log.step(&format!("test: {}", command), &output.stdout, &output.stderr);

            if !output.success() {
                return Err(Error::TestFailure {
                    step_index: index,
                    exit_code: output.exit_code,
                    command: command.to_string(),
                });
            }
        }

        info!("Smoke test passed for {}", recipe.package.name);
        Ok(log)
    }

    /// Fetch and verify the release archive into the source cache without building
    pub fn fetch(&self, recipe: &Recipe) -> Result<PathBuf> {
        check_variant(recipe, BuildVariant::Release)?;
        let cache = self.config.source_cache.as_ref().ok_or_else(|| {
            Error::InvalidRecipe("fetching without building requires a source cache".to_string())
        })?;
        let expected = declared_checksum(recipe)?;

        fs::create_dir_all(cache)?;
        let cached = cache.join(expected.cache_key());
        if cached.exists() && self.cached_is_valid(&cached, &expected)? {
            return Ok(cached);
        }

        self.download_verified(&recipe.archive_url(), &expected, &cached)?;
        Ok(cached)
    }

    /// Check whether the release archive is already in the source cache
    pub fn source_cached(&self, recipe: &Recipe) -> bool {
        let (Some(cache), Some(checksum)) = (&self.config.source_cache, &recipe.source.checksum)
        else {
            return false;
        };
        Checksum::parse_prefixed(checksum)
            .map(|c| cache.join(c.cache_key()).exists())
            .unwrap_or(false)
    }

    /// Place a verified copy of the archive at `dest`, via the cache if configured
    fn obtain_archive(&self, url: &str, expected: &Checksum, dest: &Path) -> Result<()> {
        let Some(cache) = &self.config.source_cache else {
            return self.download_verified(url, expected, dest);
        };

        fs::create_dir_all(cache)?;
        let cached = cache.join(expected.cache_key());

        if !(cached.exists() && self.cached_is_valid(&cached, expected)?) {
            self.download_verified(url, expected, &cached)?;
        } else {
            debug!("Using cached source: {}", cached.display());
        }

        fs::copy(&cached, dest)?;
        Ok(())
    }

    /// Re-verify a cached archive, discarding it on mismatch
    fn cached_is_valid(&self, cached: &Path, expected: &Checksum) -> Result<bool> {
        match verify_archive(cached, expected) {
            Ok(()) => Ok(true),
            Err(Error::Integrity { .. }) => {
                warn!("Cached file checksum mismatch, re-downloading");
                fs::remove_file(cached)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Download to a temp name next to `dest`, verify, then move into place
    fn download_verified(&self, url: &str, expected: &Checksum, dest: &Path) -> Result<()> {
        let partial = dest.with_extension("part");

        if let Err(e) = self.fetcher.fetch_archive(url, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        if let Err(e) = verify_archive(&partial, expected) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, dest)?;
        Ok(())
    }
}

/// Run one step; an executable that does not exist fails the step like a non-zero exit
fn run_step(executor: &StepExecutor, command: &ShellCommand) -> Result<StepOutput> {
    match executor.run(command) {
        Err(Error::Spawn { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!("[{}] not found: {}", command.executable(), source);
            Ok(StepOutput {
                exit_code: None,
                stdout: String::new(),
                stderr: source.to_string(),
            })
        }
        other => other,
    }
}

fn declared_checksum(recipe: &Recipe) -> Result<Checksum> {
    let declared = recipe.source.checksum.as_deref().ok_or_else(|| {
        Error::InvalidRecipe(format!("{} has no checksum", recipe.package.name))
    })?;
    Checksum::parse_prefixed(declared)
        .map_err(|e| Error::InvalidRecipe(format!("invalid checksum {}: {}", declared, e)))
}

fn test_path(install_prefix: &Path) -> String {
    let bin = install_prefix.join("bin");
    match std::env::var("PATH") {
        Ok(path) if !path.is_empty() => format!("{}:{}", bin.display(), path),
        _ => format!("{}:/usr/bin:/bin", bin.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipe;

    fn recipe(extra: &str) -> Recipe {
        parse_recipe(&format!(
            r#"
[package]
name = "tool"
version = "1.0"
homepage = "https://example.com"

[source]
archive = "/nonexistent/tool-1.0.tar.gz"

[build]
steps = [["sh", "-c", "exit 0"]]
{extra}
"#
        ))
        .unwrap()
    }

    #[test]
    fn test_release_without_checksum_is_rejected() {
        let runner = RecipeRunner::with_defaults();
        let result = runner.resolve_source(&recipe(""), BuildVariant::Release);
        assert!(matches!(result, Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_head_without_head_source_is_rejected() {
        let runner = RecipeRunner::with_defaults();
        let result = runner.resolve_source(&recipe(""), BuildVariant::HeadSource);
        assert!(matches!(result, Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_run_test_without_steps_passes() {
        let runner = RecipeRunner::with_defaults();
        let prefix = tempfile::tempdir().unwrap();
        let log = runner.run_test(&recipe(""), prefix.path()).unwrap();
        assert_eq!(log.steps_run(), 0);
    }

    #[test]
    fn test_run_test_finds_installed_binary_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let runner = RecipeRunner::with_defaults();
        let prefix = tempfile::tempdir().unwrap();
        let tool = prefix.path().join("bin/mytool");
        fs::create_dir_all(tool.parent().unwrap()).unwrap();
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let recipe = recipe(
            r#"
[test]
steps = [["sh", "-c", "command -v mytool"]]
"#,
        );
        let log = runner.run_test(&recipe, prefix.path()).unwrap();
        assert_eq!(log.steps_run(), 1);
        assert!(log.as_str().contains("bin/mytool"));
    }

    #[test]
    fn test_missing_test_binary_is_test_failure() {
        let runner = RecipeRunner::with_defaults();
        let prefix = tempfile::tempdir().unwrap();
        let recipe = recipe(
            r#"
[test]
steps = [["srmcmd-not-installed", "--help"]]
"#,
        );

        match runner.run_test(&recipe, prefix.path()) {
            Err(Error::TestFailure {
                step_index,
                exit_code,
                command,
            }) => {
                assert_eq!(step_index, 0);
                assert_eq!(exit_code, None);
                assert_eq!(command, "srmcmd-not-installed --help");
            }
            other => panic!("expected test failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_build_tool_is_build_step_error() {
        let runner = RecipeRunner::with_defaults();
        let tree = SourceTree::create(None, BuildVariant::Release).unwrap();
        let prefix = tempfile::tempdir().unwrap();
        let mut recipe = recipe("");
        recipe.build.steps = vec![
            ShellCommand::new("sh", ["-c", "exit 0"]),
            ShellCommand::new("./configure", ["--prefix=%(prefix)s"]),
        ];

        match runner.build(&recipe, BuildVariant::Release, &tree, prefix.path()) {
            Err(Error::BuildStep {
                step_index,
                exit_code,
                ..
            }) => {
                assert_eq!(step_index, 1);
                assert_eq!(exit_code, None);
            }
            other => panic!("expected build step error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_empty_steps() {
        let runner = RecipeRunner::with_defaults();
        let tree = SourceTree::create(None, BuildVariant::Release).unwrap();
        let prefix = tempfile::tempdir().unwrap();
        let mut recipe = recipe("");
        recipe.build.steps.clear();

        let result = runner.build(&recipe, BuildVariant::Release, &tree, prefix.path());
        assert!(matches!(result, Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_fetch_requires_cache() {
        let runner = RecipeRunner::with_defaults();
        let mut recipe = recipe("");
        recipe.source.checksum = Some(format!("sha256:{}", "0".repeat(64)));
        assert!(matches!(runner.fetch(&recipe), Err(Error::InvalidRecipe(_))));
        assert!(!runner.source_cached(&recipe));
    }

    #[test]
    fn test_test_path_puts_prefix_bin_first() {
        let path = test_path(Path::new("/opt/tool"));
        assert!(path.starts_with("/opt/tool/bin:"));
    }
}
