//! Command-line interface for skillkit.
//!
//! Three subcommands cover the tool's surface:
//!
//! - `install` - provision catalog skills and MCP servers into host
//!   applications
//! - `uninstall` - symmetric removal of everything `install` placed
//! - `git-mcp` - clone/build an MCP server from a git repository and
//!   record it in host configuration
//!
//! The interface is flag-driven rather than interactive: hosts, scopes,
//! and item selections all arrive as arguments, already validated before
//! the engines run. Hosts are visited independently, so one host's
//! failure is reported and its siblings still proceed.
//!
//! # Examples
//!
//! ```bash
//! # Everything, project-scoped, all catalog hosts
//! skillkit install
//!
//! # User-scope MCP config for two hosts, skills untouched
//! skillkit install --mcp-only --mcp-scope global --host claude --host cursor
//!
//! # Remove what the default install placed
//! skillkit uninstall
//!
//! # Record a git-sourced server
//! skillkit git-mcp --url https://github.com/example/mcp.git \
//!     --name example --command node --args "dist/index.js" \
//!     --build "npm install" --build "npm run build"
//! ```

mod git_mcp;
mod install;
mod uninstall;

use crate::catalog::{Catalog, HostApplication};
use crate::core::SkillkitError;
use crate::paths::{self, ResolvedPaths};
use crate::platform::Platform;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level CLI for skillkit.
#[derive(Parser)]
#[command(
    name = "skillkit",
    about = "Provision agent skills and MCP server configurations across host applications",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root for local-scope installs (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    project_root: Option<String>,

    /// Catalog file overriding the embedded one
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install catalog skills and MCP server configurations
    Install(install::InstallCommand),

    /// Remove skills and MCP server entries installed by this tool
    Uninstall(uninstall::UninstallCommand),

    /// Install an MCP server from a git repository
    GitMcp(git_mcp::GitMcpCommand),
}

/// Everything a command needs that is computed once per run.
pub(crate) struct RunContext {
    pub catalog: Catalog,
    pub project_root: PathBuf,
    pub host_paths: BTreeMap<String, ResolvedPaths>,
}

impl Cli {
    /// Resolves shared state and dispatches to the subcommand.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let catalog = match &self.catalog {
            Some(path) => {
                let expanded = shellexpand::tilde(path).to_string();
                Catalog::load(std::path::Path::new(&expanded))?
            }
            None => Catalog::builtin()?,
        };

        let project_root = resolve_project_root(self.project_root.as_deref())?;
        let platform = Platform::detect();
        tracing::debug!(
            "Detected OS: {}, project root: {}",
            platform.display_name(),
            project_root.display()
        );

        let host_paths =
            paths::resolve_host_paths(&project_root, &platform, &catalog.hosts)?;
        let context = RunContext {
            catalog,
            project_root,
            host_paths,
        };

        match self.command {
            Commands::Install(cmd) => cmd.execute(&context).await,
            Commands::Uninstall(cmd) => cmd.execute(&context).await,
            Commands::GitMcp(cmd) => cmd.execute(&context).await,
        }
    }
}

/// Validates the requested host ids against the catalog.
///
/// An empty request selects every catalog host; selecting zero hosts is
/// fatal to the run since every operation needs at least one target.
pub(crate) fn select_hosts<'a>(
    catalog: &'a Catalog,
    requested: &[String],
) -> Result<Vec<&'a HostApplication>> {
    let hosts: Vec<&HostApplication> = if requested.is_empty() {
        catalog.hosts.iter().collect()
    } else {
        requested
            .iter()
            .map(|id| catalog.host(id))
            .collect::<Result<Vec<_>>>()?
    };

    if hosts.is_empty() {
        return Err(SkillkitError::ConfigError {
            message: "no host applications selected".to_string(),
        }
        .into());
    }

    Ok(hosts)
}

pub(crate) fn info(message: impl AsRef<str>) {
    println!("{} {}", "→".blue(), message.as_ref());
}

pub(crate) fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green(), message.as_ref());
}

pub(crate) fn warn(message: impl AsRef<str>) {
    eprintln!("{} {}", "!".yellow().bold(), message.as_ref());
}

pub(crate) fn failure(message: impl AsRef<str>) {
    eprintln!("{} {}", "✗".red().bold(), message.as_ref());
}

fn resolve_project_root(arg: Option<&str>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    match arg {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw).to_string();
            let path = PathBuf::from(expanded);
            Ok(if path.is_absolute() {
                path
            } else {
                cwd.join(path)
            })
        }
        None => Ok(cwd),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_hosts_defaults_to_all() {
        let catalog = Catalog::builtin().unwrap();
        let hosts = select_hosts(&catalog, &[]).unwrap();
        assert_eq!(hosts.len(), catalog.hosts.len());
    }

    #[test]
    fn select_hosts_rejects_unknown_ids() {
        let catalog = Catalog::builtin().unwrap();
        let err =
            select_hosts(&catalog, &["claude".to_string(), "emacs".to_string()]).unwrap_err();
        let err = err.downcast::<SkillkitError>().unwrap();
        assert!(matches!(err, SkillkitError::HostNotFound { .. }));
    }

    #[test]
    fn select_hosts_preserves_request_order() {
        let catalog = Catalog::builtin().unwrap();
        let hosts =
            select_hosts(&catalog, &["vscode".to_string(), "claude".to_string()]).unwrap();
        assert_eq!(hosts[0].id, "vscode");
        assert_eq!(hosts[1].id, "claude");
    }

    #[test]
    fn cli_parses_install_flags() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "skillkit",
            "install",
            "--host",
            "claude",
            "--mcp-scope",
            "global",
            "--mcp-only",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Install(_)));
    }
}
