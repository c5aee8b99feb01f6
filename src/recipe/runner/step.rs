// src/recipe/runner/step.rs

//! Execution of a single recipe command
//!
//! Commands run without a shell: the executable is spawned directly with
//! its arguments. stdin is nulled and stdout/stderr are spooled to
//! anonymous temp files, so chatty builds cannot fill a pipe and stall.

use crate::error::{Error, Result};
use crate::recipe::format::ShellCommand;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Outcome of a command that ran to completion
#[derive(Debug)]
pub struct StepOutput {
    /// Exit code, `None` when terminated by a signal or never started
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs commands in a fixed directory and environment
#[derive(Debug, Clone)]
pub struct StepExecutor {
    workdir: PathBuf,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl StepExecutor {
    pub fn new(workdir: &Path, timeout: Duration) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            env: Vec::new(),
            timeout,
        }
    }

    /// Add an environment variable for every command
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a command to completion
    ///
    /// A non-zero exit is not an error here; callers decide how to report
    /// it. Spawn failures and timeouts are.
    pub fn run(&self, command: &ShellCommand) -> Result<StepOutput> {
        debug!("Command: {} (in {})", command, self.workdir.display());

        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        let mut child = Command::new(self.program(command.executable()))
            .args(command.arguments())
            .current_dir(&self.workdir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                source,
            })?;

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        let stdout = read_spool(&mut stdout_file)?;
        let stderr = read_spool(&mut stderr_file)?;

        if !status.success() {
            for line in stderr.lines() {
                warn!("[{}] {}", command.executable(), line);
            }
        }

        Ok(StepOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }

    /// Resolve relative executables like `./configure` against the workdir
    fn program(&self, executable: &str) -> PathBuf {
        let path = Path::new(executable);
        if path.is_relative() && executable.contains('/') {
            self.workdir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

fn read_spool(file: &mut File) -> Result<String> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
