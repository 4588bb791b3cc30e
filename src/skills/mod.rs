//! Skill acquisition and placement.
//!
//! Skills are documentation bundles distributed as npm packages, each
//! shipping a single `SKILL.md` artifact. Installation stages every
//! requested package at once by synthesizing a throwaway manifest in a
//! scratch directory and letting npm materialize the dependency tree, then
//! copies each package's artifact into the resolved target directories:
//!
//! ```text
//! <staging>/package.json            {"private": true, deps pinned "latest"}
//! <staging>/node_modules/<pkg>/SKILL.md
//!          └── copied to <target>[/<shared>]/<pkg minus "-skill">/SKILL.md
//! ```
//!
//! One npm invocation covers every package; its failure aborts the whole
//! install step before anything touches a target. A package that shipped
//! no artifact is skipped silently; skills are optional payload, not a
//! contract every package honors.
//!
//! Staging cleanup is a separate explicit call so the orchestrating layer
//! can always attempt it, even after a failed install.

use crate::catalog::Skill;
use crate::platform;
use crate::process::{CommandRunner, CommandSpec};
use crate::utils;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Well-known artifact filename inside each skill package.
pub const SKILL_ARTIFACT: &str = "SKILL.md";

/// Usage guide deposited alongside installed skills.
const USAGE_GUIDE_TEMPLATE: &str = include_str!("../../assets/skills-guide.md");

/// One destination for skill placement.
#[derive(Debug, Clone)]
pub struct SkillTarget {
    /// Skills directory for one host at the selected scope
    pub path: PathBuf,
    /// Whether this host nests skills under the shared subfolder
    pub nest: bool,
}

impl SkillTarget {
    fn effective_dir(&self, shared_subfolder: Option<&str>) -> PathBuf {
        match shared_subfolder {
            Some(folder) if self.nest => self.path.join(folder),
            _ => self.path.clone(),
        }
    }
}

/// Result of an install pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallReport {
    /// Per-target install count: total placements divided by target count.
    /// This is the figure reported as "N skills installed to M locations".
    pub installed: usize,
    /// Raw number of artifact placements across all targets
    pub placed: usize,
}

/// Result of an uninstall pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalReport {
    /// Number of skill folders deleted across all targets
    pub removed: usize,
}

/// Stages the requested packages and places their artifacts into every
/// target.
///
/// The npm invocation is a single blocking step; a non-zero exit aborts
/// the operation before any target is touched. Individual packages
/// without a `SKILL.md` are skipped without error.
pub async fn install(
    runner: &impl CommandRunner,
    skills: &[Skill],
    targets: &[SkillTarget],
    staging_dir: &Path,
    shared_subfolder: Option<&str>,
    usage_guide_name: &str,
) -> Result<InstallReport> {
    if skills.is_empty() || targets.is_empty() {
        return Ok(InstallReport {
            installed: 0,
            placed: 0,
        });
    }

    stage_packages(runner, skills, staging_dir).await?;

    let mut placed = 0;
    for target in targets {
        let skills_dir = target.effective_dir(shared_subfolder);
        utils::ensure_dir(&skills_dir)?;

        for skill in skills {
            let artifact = staging_dir
                .join("node_modules")
                .join(skill.npm_name())
                .join(SKILL_ARTIFACT);
            if !artifact.is_file() {
                tracing::debug!(
                    target: "skills",
                    "Package {} ships no {}; skipping",
                    skill.npm_name(),
                    SKILL_ARTIFACT
                );
                continue;
            }

            let skill_dir = skills_dir.join(skill.folder_name());
            utils::ensure_dir(&skill_dir)?;
            fs::copy(&artifact, skill_dir.join(SKILL_ARTIFACT)).with_context(|| {
                format!(
                    "Failed to copy {} into {}",
                    artifact.display(),
                    skill_dir.display()
                )
            })?;
            placed += 1;
        }

        utils::atomic_write(
            &skills_dir.join(usage_guide_name),
            USAGE_GUIDE_TEMPLATE.as_bytes(),
        )?;
    }

    Ok(InstallReport {
        installed: placed / targets.len(),
        placed,
    })
}

/// Removes installed skill folders and the usage guide from every target.
///
/// Nothing-to-remove is not an error; each absent folder simply counts as
/// zero. A shared subfolder is deleted only once it is empty, since it may hold
/// content this tool did not create.
pub fn uninstall(
    skills: &[Skill],
    targets: &[SkillTarget],
    shared_subfolder: Option<&str>,
    usage_guide_name: &str,
) -> Result<RemovalReport> {
    let mut removed = 0;

    for target in targets {
        let skills_dir = target.effective_dir(shared_subfolder);

        for skill in skills {
            let skill_dir = skills_dir.join(skill.folder_name());
            if skill_dir.is_dir() {
                fs::remove_dir_all(&skill_dir).with_context(|| {
                    format!("Failed to remove skill folder: {}", skill_dir.display())
                })?;
                removed += 1;
            }
        }

        let guide = skills_dir.join(usage_guide_name);
        if guide.is_file() {
            fs::remove_file(&guide)
                .with_context(|| format!("Failed to remove usage guide: {}", guide.display()))?;
        }

        if shared_subfolder.is_some() && target.nest {
            utils::remove_dir_if_empty(&skills_dir)?;
        }
    }

    Ok(RemovalReport { removed })
}

/// Removes the staging directory.
///
/// Always safe to call: an already-gone directory is the expected state
/// after a clean run and is not an error.
pub fn cleanup_staging(staging_dir: &Path) -> Result<()> {
    if staging_dir.exists() {
        fs::remove_dir_all(staging_dir).with_context(|| {
            format!("Failed to remove staging directory: {}", staging_dir.display())
        })?;
    }
    Ok(())
}

/// Writes the throwaway manifest and runs the package manager once for
/// every requested package.
async fn stage_packages(
    runner: &impl CommandRunner,
    skills: &[Skill],
    staging_dir: &Path,
) -> Result<()> {
    utils::ensure_dir(staging_dir)?;

    let dependencies: serde_json::Map<String, serde_json::Value> = skills
        .iter()
        .map(|skill| (skill.npm_name().to_string(), json!("latest")))
        .collect();
    let manifest = json!({
        "name": "skillkit-staging",
        "version": "0.0.0",
        "private": true,
        "dependencies": dependencies,
    });
    utils::write_json_document(&staging_dir.join("package.json"), &manifest)?;

    let spec = CommandSpec::new(platform::npm_program(), "install")
        .args(["install", "--omit=dev"])
        .current_dir(staging_dir);
    runner.run(spec).await?;

    Ok(())
}
