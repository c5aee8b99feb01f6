// src/error.rs

//! Error types for recipe parsing and cooking

use std::time::Duration;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or running a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Source could not be downloaded or checked out
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Fetched archive does not match the declared checksum
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    /// A build step exited non-zero, was killed by a signal or could not be found
    #[error("build step {step_index} (`{command}`) failed with {}", describe_exit(.exit_code))]
    BuildStep {
        step_index: usize,
        exit_code: Option<i32>,
        command: String,
    },

    /// The post-install smoke test exited non-zero
    #[error("test step {step_index} (`{command}`) failed with {}", describe_exit(.exit_code))]
    TestFailure {
        step_index: usize,
        exit_code: Option<i32>,
        command: String,
    },

    /// A step could not be started at all
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A step ran past the configured timeout and was killed
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Recipe text is not valid TOML or does not match the format
    #[error("parse error: {0}")]
    Parse(String),

    /// Recipe parsed but cannot be run as requested
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Source archive could not be unpacked
    #[error("archive error: {0}")]
    Archive(String),

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit status (killed by a signal or not found)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_step_message_names_command_and_code() {
        let err = Error::BuildStep {
            step_index: 1,
            exit_code: Some(2),
            command: "make install".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("step 1"));
        assert!(msg.contains("make install"));
        assert!(msg.contains("exit code 2"));
    }

    #[test]
    fn test_signal_exit_message() {
        let err = Error::TestFailure {
            step_index: 0,
            exit_code: None,
            command: "srmcmd --help".to_string(),
        };
        assert!(err.to_string().contains("no exit status"));
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = Error::Timeout {
            command: "sleep 10".to_string(),
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "`sleep 10` timed out after 200ms");
    }
}
