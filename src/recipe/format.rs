// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe how to fetch, build, install and
//! smoke-test a third-party tool. Commands are written as string arrays
//! whose first element is the executable:
//!
//! ```toml
//! [build]
//! steps = [
//!     ["./configure", "--disable-debug", "--prefix=%(prefix)s"],
//!     ["make", "install"],
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A complete recipe for building and installing a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Where the source comes from
    pub source: SourceSection,

    /// Release build instructions
    pub build: BuildSection,

    /// Overrides applied when building from the head revision (optional)
    #[serde(default)]
    pub head: Option<HeadSection>,

    /// Post-install smoke test
    #[serde(default)]
    pub test: TestSection,

    /// Variables for substitution (optional)
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl Recipe {
    /// Substitute variables in a string
    ///
    /// Replaces `%(name)s` patterns with their values from:
    /// 1. Built-in variables (name, version, prefix)
    /// 2. Custom variables from the [variables] section
    ///
    /// The template is scanned once; substituted values are inserted
    /// verbatim and never expanded again. Unknown names are left as written.
    pub fn substitute(&self, template: &str, prefix: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("%(") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after
                .find(")s")
                .and_then(|end| Some((end, self.variable(&after[..end], prefix)?)))
            {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str("%(");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    fn variable<'a>(&'a self, key: &str, prefix: &'a str) -> Option<&'a str> {
        match key {
            "version" => Some(&self.package.version),
            "name" => Some(&self.package.name),
            "prefix" => Some(prefix),
            _ => self.variables.get(key).map(String::as_str),
        }
    }

    /// Substitute variables into the executable and every argument of a command
    pub fn substitute_command(&self, command: &ShellCommand, prefix: &str) -> ShellCommand {
        ShellCommand {
            executable: self.substitute(&command.executable, prefix),
            arguments: command
                .arguments
                .iter()
                .map(|arg| self.substitute(arg, prefix))
                .collect(),
        }
    }

    /// Get the archive URL with variables substituted
    pub fn archive_url(&self) -> String {
        self.substitute(&self.source.archive, "")
    }

    /// Get the archive filename from the URL
    pub fn archive_filename(&self) -> String {
        let url = self.archive_url();
        match url.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "source.tar.gz".to_string(),
        }
    }

    /// Whether the recipe can be built from its head revision
    pub fn supports_head(&self) -> bool {
        self.source.head.is_some()
    }

    /// The ordered install sequence for a variant
    ///
    /// HeadSource prepends the bootstrap steps and may replace the release
    /// steps with its own (typically a reduced configure flag set).
    pub fn install_steps(&self, variant: BuildVariant) -> Vec<&ShellCommand> {
        match (variant, &self.head) {
            (BuildVariant::HeadSource, Some(head)) => head
                .bootstrap
                .iter()
                .chain(head.steps.as_ref().unwrap_or(&self.build.steps))
                .collect(),
            _ => self.build.steps.iter().collect(),
        }
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Homepage URL
    pub homepage: String,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,
}

/// Source section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Release archive URL
    ///
    /// Supports `%(version)s` substitution. `file://` URLs and plain paths
    /// are read from the local filesystem.
    pub archive: String,

    /// Checksum for the release archive (`sha256:...`)
    ///
    /// Required to build the Release variant.
    #[serde(default)]
    pub checksum: Option<String>,

    /// Version-control reference for HeadSource builds
    #[serde(default)]
    pub head: Option<HeadSource>,

    /// Directory name after extraction (if different from archive name)
    #[serde(default)]
    pub extract_dir: Option<String>,
}

/// A version-control reference (git)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadSource {
    /// Repository URL
    pub url: String,

    /// Branch to check out (default: the remote HEAD)
    #[serde(default)]
    pub branch: Option<String>,
}

/// Build instructions section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Install steps, run in order inside the source directory
    ///
    /// Arguments support `%(variable)s` substitution, notably `%(prefix)s`.
    pub steps: Vec<ShellCommand>,

    /// Environment variables to set during build
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Working directory within source (relative path)
    #[serde(default)]
    pub workdir: Option<String>,
}

/// Head-revision overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadSection {
    /// Steps that regenerate the build scripts (e.g. `autoreconf -fi`)
    #[serde(default)]
    pub bootstrap: Vec<ShellCommand>,

    /// Replacement for `build.steps` (defaults to the release steps)
    #[serde(default)]
    pub steps: Option<Vec<ShellCommand>>,
}

/// Smoke test section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSection {
    /// Commands run against the installed tool; any non-zero exit fails
    #[serde(default)]
    pub steps: Vec<ShellCommand>,
}

/// Which source a recipe is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildVariant {
    /// Tagged, checksummed release archive
    #[default]
    Release,
    /// Latest version-control revision, unchecksummed
    HeadSource,
}

impl BuildVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Release => "release",
            BuildVariant::HeadSource => "head",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single external command: an executable and its arguments
///
/// Immutable once constructed. Serialized as a string array whose first
/// element is the executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ShellCommand {
    executable: String,
    arguments: Vec<String>,
}

impl ShellCommand {
    pub fn new<I, S>(executable: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl TryFrom<Vec<String>> for ShellCommand {
    type Error = String;

    fn try_from(mut parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.is_empty() || parts[0].is_empty() {
            return Err("command must name an executable".to_string());
        }
        let executable = parts.remove(0);
        Ok(Self {
            executable,
            arguments: parts,
        })
    }
}

impl From<ShellCommand> for Vec<String> {
    fn from(command: ShellCommand) -> Self {
        let mut parts = Vec::with_capacity(command.arguments.len() + 1);
        parts.push(command.executable);
        parts.extend(command.arguments);
        parts
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
