//! Per-host, per-scope path resolution.
//!
//! Given a project root, the detected platform, and the host table from the
//! catalog, this module computes every absolute path the installer will
//! read or write. It is pure path arithmetic over the environment (home
//! directory, application-support root); nothing here touches the file
//! system, and the same inputs always resolve to the same paths.

use crate::catalog::HostApplication;
use crate::platform::{self, Platform};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Whether an artifact is installed per-project or per-user.
///
/// Skills and MCP configuration scopes are selected independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scope {
    /// Install under the project root
    Local,
    /// Install under the user's home / application-support directories
    Global,
}

impl Scope {
    /// Label for status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

/// Every path the installer needs for one host application.
///
/// Recomputed every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// User-scope skills directory (`<home>/<skills_path>`)
    pub skills_dir: PathBuf,
    /// Project-scope skills directory (`<project>/<skills_path>`)
    pub local_skills_dir: PathBuf,
    /// User-scope MCP config file
    pub mcp_config: PathBuf,
    /// Project-scope MCP config file (`<project>/<mcp_config_file>`)
    pub local_mcp_config: PathBuf,
    /// JSON key holding the server map at project scope
    pub mcp_server_key: String,
    /// JSON key holding the server map at user scope
    pub global_mcp_server_key: String,
}

impl ResolvedPaths {
    /// Skills directory for the given scope.
    #[must_use]
    pub fn skills_dir_for(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Local => &self.local_skills_dir,
            Scope::Global => &self.skills_dir,
        }
    }

    /// MCP config file for the given scope.
    #[must_use]
    pub fn mcp_config_for(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Local => &self.local_mcp_config,
            Scope::Global => &self.mcp_config,
        }
    }

    /// Server key for the given scope, opaque as declared by the host.
    #[must_use]
    pub fn server_key_for(&self, scope: Scope) -> &str {
        match scope {
            Scope::Local => &self.mcp_server_key,
            Scope::Global => &self.global_mcp_server_key,
        }
    }
}

/// Scope-dependent directories for git-sourced repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDirs {
    /// Where a skills repository is cloned
    pub skills_repo: PathBuf,
    /// Parent directory for per-server MCP repository clones
    pub mcp_repos: PathBuf,
}

/// Resolves paths for every host in the table.
///
/// User-scope MCP config prefers the host's declared application-support
/// file; hosts without one (e.g. Codex) fall back to the home-relative
/// config file template. Server keys pass through unchanged: they are
/// opaque strings owned by the host's configuration format.
pub fn resolve_host_paths(
    project_root: &Path,
    platform: &Platform,
    hosts: &[HostApplication],
) -> Result<BTreeMap<String, ResolvedPaths>> {
    let home = platform::home_dir()?;
    let app_support = platform::app_support_root(platform)?;

    let mut resolved = BTreeMap::new();
    for host in hosts {
        let mcp_config = match &host.global_mcp_config_file {
            Some(rel) => app_support.join(rel),
            None => home.join(&host.mcp_config_file),
        };

        resolved.insert(
            host.id.clone(),
            ResolvedPaths {
                skills_dir: home.join(&host.skills_path),
                local_skills_dir: project_root.join(&host.skills_path),
                mcp_config,
                local_mcp_config: project_root.join(&host.mcp_config_file),
                mcp_server_key: host.mcp_server_key.clone(),
                global_mcp_server_key: host.global_mcp_server_key.clone(),
            },
        );
    }

    Ok(resolved)
}

/// Resolves the repository directories for the given scope.
///
/// Local scope keeps clones inside the project under `.skillkit/`; global
/// scope keeps them under the user's home directory.
pub fn repo_dirs(scope: Scope, project_root: &Path) -> Result<RepoDirs> {
    let base = match scope {
        Scope::Local => project_root.join(".skillkit"),
        Scope::Global => platform::home_dir()?.join(".skillkit"),
    };

    Ok(RepoDirs {
        skills_repo: base.join("skills-repo"),
        mcp_repos: base.join("mcp-repos"),
    })
}
