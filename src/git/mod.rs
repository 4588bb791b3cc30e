//! Git repository acquisition for git-sourced MCP servers.
//!
//! Like Cargo with `git-fetch-with-cli`, this wraps the system `git`
//! binary rather than an embedded Git library, so existing credential
//! helpers, SSH agents, and platform Git configuration all keep working.
//! Commands run through the [`crate::process`] boundary.
//!
//! The safety rules here are strict because the target directories live in
//! user space:
//!
//! - An existing clone is only ever moved forward (`pull --ff-only`);
//!   divergence is surfaced as a failure, never resolved by force-reset.
//! - A directory that exists but carries no version-control marker is
//!   refused outright: its contents are not this tool's to overwrite.

use crate::core::SkillkitError;
use crate::process::{CommandRunner, CommandSpec};
use crate::utils;
use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Candidate skills locations probed inside an arbitrary repository.
pub const SKILLS_DIR_CANDIDATES: &[&str] = &["skills", "docs/skills", ".claude/skills"];

/// How [`ensure_repo`] satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoAction {
    /// Fresh shallow clone
    Cloned,
    /// Existing clone fast-forwarded
    Updated,
}

impl RepoAction {
    /// Past-tense label for status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cloned => "cloned",
            Self::Updated => "updated",
        }
    }
}

/// Outcome of [`ensure_repo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureRepoOutcome {
    /// What happened
    pub action: RepoAction,
    /// The repository directory
    pub dir: PathBuf,
}

/// Checks for the version-control marker directory.
#[must_use]
pub fn is_git_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Makes `dir` an up-to-date clone of `url`.
///
/// - Missing directory: shallow clone (`--depth 1`).
/// - Existing clone: `pull --ff-only`; an impossible fast-forward fails
///   with [`SkillkitError::FastForwardFailed`] and leaves the clone alone.
/// - Existing directory without a `.git` marker: fails with
///   [`SkillkitError::NotAGitRepo`] without touching its contents.
pub async fn ensure_repo(
    runner: &impl CommandRunner,
    url: &str,
    dir: &Path,
) -> Result<EnsureRepoOutcome> {
    if dir.exists() {
        if !is_git_repo(dir) {
            return Err(SkillkitError::NotAGitRepo {
                path: dir.display().to_string(),
            }
            .into());
        }

        let spec = CommandSpec::new(crate::platform::git_program(), "pull")
            .args(["pull", "--ff-only"])
            .current_dir(dir);
        if let Err(err) = runner.run(spec).await {
            return Err(SkillkitError::FastForwardFailed {
                path: dir.display().to_string(),
                reason: failure_reason(&err),
            }
            .into());
        }

        return Ok(EnsureRepoOutcome {
            action: RepoAction::Updated,
            dir: dir.to_path_buf(),
        });
    }

    if let Some(parent) = dir.parent() {
        utils::ensure_dir(parent)?;
    }

    let spec = CommandSpec::new(crate::platform::git_program(), "clone")
        .args(["clone", "--depth", "1"])
        .arg(url)
        .arg(dir.display().to_string());
    if let Err(err) = runner.run(spec).await {
        return Err(SkillkitError::GitCloneFailed {
            url: url.to_string(),
            reason: failure_reason(&err),
        }
        .into());
    }

    Ok(EnsureRepoOutcome {
        action: RepoAction::Cloned,
        dir: dir.to_path_buf(),
    })
}

/// Runs declared build commands sequentially inside the repository.
///
/// Each command string is split on whitespace into a program and its
/// arguments. The first non-zero exit aborts the remaining sequence.
/// Empty or absent command lists are a no-op.
pub async fn run_build_commands(
    runner: &impl CommandRunner,
    dir: &Path,
    commands: &[String],
) -> Result<()> {
    for command in commands {
        let Some(spec) = CommandSpec::from_command_line(command, "build") else {
            continue;
        };
        tracing::debug!(target: "git", "Running build command in {}: {}", dir.display(), command);
        runner.run(spec.current_dir(dir)).await?;
    }
    Ok(())
}

/// Returns the first candidate path that exists under the repository.
///
/// `None` means the repository bundles no skills, which is not an error;
/// plenty of MCP server repositories ship none.
#[must_use]
pub fn find_skills_dir(repo_dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(|candidate| repo_dir.join(candidate)).find(|path| path.exists())
}

/// Recursive, overwriting copy of a skills tree into a target directory.
pub fn copy_skills(source_dir: &Path, target_dir: &Path) -> Result<()> {
    utils::copy_dir(source_dir, target_dir)
}

fn failure_reason(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SkillkitError>() {
        Some(SkillkitError::CommandFailed { stderr, .. }) => stderr.trim().to_string(),
        _ => err.to_string(),
    }
}
