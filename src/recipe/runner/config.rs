// src/recipe/runner/config.rs

//! Configuration and result types for the recipe runner

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the RecipeRunner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory for verified release archives (None = no caching)
    pub source_cache: Option<PathBuf>,
    /// Parent for temporary work directories (None = system temp dir)
    pub work_root: Option<PathBuf>,
    /// Timeout for each individual step
    pub step_timeout: Duration,
    /// Timeout for archive downloads
    pub http_timeout: Duration,
    /// Keep the work directory after a successful install
    pub keep_workdir: bool,
    /// Skip the post-install smoke test
    pub skip_test: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            source_cache: None,
            work_root: None,
            step_timeout: Duration::from_secs(3600), // 1 hour
            http_timeout: Duration::from_secs(300),
            keep_workdir: false,
            skip_test: false,
        }
    }
}

/// Accumulated output of the steps run so far
#[derive(Debug, Default, Clone)]
pub struct BuildLog {
    text: String,
    steps_run: usize,
}

impl BuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Record a finished step's output under a header
    pub fn step(&mut self, header: &str, stdout: &str, stderr: &str) {
        self.steps_run += 1;
        self.line(&format!("=== {} ===", header));
        if !stdout.is_empty() {
            self.line(stdout.trim_end());
        }
        if !stderr.is_empty() {
            self.line(stderr.trim_end());
        }
    }

    pub fn append(&mut self, other: BuildLog) {
        self.text.push_str(&other.text);
        self.steps_run += other.steps_run;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of steps that ran to completion
    pub fn steps_run(&self) -> usize {
        self.steps_run
    }
}

/// Result of a full install run
#[derive(Debug)]
pub struct InstallResult {
    /// Prefix the tool was installed into
    pub prefix: PathBuf,
    /// Build and test output
    pub log: BuildLog,
    /// Retained work directory, when requested
    pub workdir: Option<PathBuf>,
    /// Whether the smoke test ran
    pub tested: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert!(config.source_cache.is_none());
        assert!(!config.keep_workdir);
        assert!(!config.skip_test);
        assert_eq!(config.step_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_build_log_append() {
        let mut log = BuildLog::new();
        log.step("configure", "checking for gcc... yes\n", "");
        let mut test = BuildLog::new();
        test.step("test", "usage: srmcmd", "");
        log.append(test);

        assert_eq!(log.steps_run(), 2);
        assert!(log.as_str().contains("=== configure ==="));
        assert!(log.as_str().contains("usage: srmcmd"));
    }
}
