//! External-process execution boundary.
//!
//! Every external program this tool runs (npm for skill packages, git for
//! repository clones, declared build commands) goes through the narrow
//! interface here: build a [`CommandSpec`], hand it to a [`CommandRunner`],
//! get captured output back or a domain error on non-zero exit. The engines
//! are generic over the runner, so their tests use a scripted in-memory
//! runner instead of real binaries.
//!
//! [`SystemRunner`] is the production implementation on top of
//! `tokio::process`. Invocations are logged via `tracing` and carry a
//! default five-minute timeout; on expiry the child process is terminated
//! and the call fails with [`SkillkitError::CommandTimeout`]. A hung
//! package manager or git process therefore cannot block a run forever.

use crate::core::SkillkitError;
use crate::platform;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout applied to every external process invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A fully described external-process invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to invoke (e.g. "git", "npm.cmd")
    pub program: String,
    /// Arguments, passed as separate parameters (never a shell string)
    pub args: Vec<String>,
    /// Working directory; process inherits the current one when unset
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables
    pub envs: Vec<(String, String)>,
    /// Logical operation label for logging and error messages
    pub operation: String,
    /// Maximum run time; `None` disables the timeout
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Creates a spec with the default timeout and no working directory.
    pub fn new(program: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            operation: operation.into(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Parses a whitespace-separated command line into a spec.
    ///
    /// Returns `None` for empty or all-whitespace input. No quoting rules:
    /// declared build commands are split on whitespace, nothing more.
    pub fn from_command_line(line: &str, operation: impl Into<String>) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        let mut spec = Self::new(program, operation);
        spec.args = parts.map(str::to_string).collect();
        Some(spec)
    }

    /// Appends a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn rendered(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error (may be non-empty on success)
    pub stderr: String,
}

/// Runs external processes to completion.
///
/// The contract is deliberately narrow: run the command, wait for it,
/// return captured output, fail on non-zero exit. There is no streaming
/// and no concurrency; callers sequence invocations themselves.
pub trait CommandRunner: Send + Sync {
    /// Executes the spec, failing on non-zero exit or timeout.
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // Dropping the future on timeout must take the child with it
        command.kill_on_drop(true);

        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &spec.envs {
            command.env(key, value);
        }

        tracing::debug!(target: "process", "Executing command: {}", spec.rendered());

        let child = command
            .spawn()
            .with_context(|| format!("Failed to spawn {}", spec.rendered()))?;
        let output_future = child.wait_with_output();

        let output = if let Some(duration) = spec.timeout {
            match timeout(duration, output_future).await {
                Ok(result) => result
                    .with_context(|| format!("Failed to execute {}", spec.rendered()))?,
                Err(_) => {
                    tracing::warn!(
                        target: "process",
                        "Command timed out after {}s: {}",
                        duration.as_secs(),
                        spec.rendered()
                    );
                    return Err(SkillkitError::CommandTimeout {
                        program: spec.program,
                        operation: spec.operation,
                        seconds: duration.as_secs(),
                    }
                    .into());
                }
            }
        } else {
            output_future
                .await
                .with_context(|| format!("Failed to execute {}", spec.rendered()))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "process",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                spec.rendered()
            );
            return Err(SkillkitError::CommandFailed {
                program: spec.program,
                operation: spec.operation,
                stderr: if stderr.trim().is_empty() {
                    stdout
                } else {
                    stderr
                },
            }
            .into());
        }

        if !stdout.trim().is_empty() {
            tracing::trace!(target: "process", "{}", stdout.trim());
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Verifies that git is reachable on PATH.
pub fn ensure_git_available() -> Result<()> {
    which::which(platform::git_program())
        .map(|_| ())
        .map_err(|_| SkillkitError::GitNotFound.into())
}

/// Verifies that npm is reachable on PATH.
pub fn ensure_npm_available() -> Result<()> {
    which::which(platform::npm_program())
        .map(|_| ())
        .map_err(|_| SkillkitError::NpmNotFound.into())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_command_line_splits_on_whitespace() {
        let spec = CommandSpec::from_command_line("npm  install --omit=dev", "build").unwrap();
        assert_eq!(spec.program, "npm");
        assert_eq!(spec.args, vec!["install", "--omit=dev"]);
    }

    #[test]
    fn from_command_line_rejects_blank_input() {
        assert!(CommandSpec::from_command_line("", "build").is_none());
        assert!(CommandSpec::from_command_line("   ", "build").is_none());
    }

    #[test]
    fn spec_builder_accumulates_args_and_env() {
        let spec = CommandSpec::new("git", "clone")
            .args(["clone", "--depth", "1"])
            .arg("https://example.com/repo.git")
            .env("GIT_TERMINAL_PROMPT", "0");
        assert_eq!(spec.args.len(), 4);
        assert_eq!(spec.envs.len(), 1);
        assert_eq!(spec.timeout, Some(DEFAULT_TIMEOUT));
    }

    #[tokio::test]
    async fn system_runner_captures_failure_output() {
        // `git` with a bogus subcommand exits non-zero everywhere git exists;
        // fall back to a missing-program spawn error if it does not.
        if ensure_git_available().is_err() {
            return;
        }
        let spec = CommandSpec::new(platform::git_program(), "definitely-not-a-subcommand")
            .arg("definitely-not-a-subcommand");
        let err = SystemRunner.run(spec).await.unwrap_err();
        let err = err.downcast::<SkillkitError>().unwrap();
        assert!(matches!(err, SkillkitError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn fake_runner_records_invocations() {
        let runner = testing::FakeRunner::succeeding();
        let spec = CommandSpec::new("npm", "install").arg("install");
        runner.run(spec).await.unwrap();
        assert_eq!(runner.call_count(), 1);
        assert_eq!(runner.recorded()[0].program, "npm");
    }
}
