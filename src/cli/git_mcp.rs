//! `skillkit git-mcp` - install an MCP server from a git repository.

use super::RunContext;
use crate::catalog::ServerDefinition;
use crate::git;
use crate::mcp;
use crate::paths::{self, Scope};
use crate::process::{self, SystemRunner};
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Clone (or update) a git repository, optionally build it, and record it
/// as an MCP server in host configuration.
#[derive(Args)]
pub struct GitMcpCommand {
    /// Repository URL to clone
    #[arg(long)]
    url: String,

    /// Server name recorded in host configuration
    #[arg(long)]
    name: String,

    /// Command the host runs to launch the server
    #[arg(long)]
    command: String,

    /// Whitespace-separated argument string; a relative first argument is
    /// joined onto the cloned repository path
    #[arg(long, default_value = "")]
    args: String,

    /// Transport type recorded on the server entry
    #[arg(long, value_name = "TYPE", default_value = "stdio")]
    transport: String,

    /// Build command run inside the clone; repeatable, run in order
    #[arg(long = "build", value_name = "COMMAND")]
    build_commands: Vec<String>,

    /// Where the repository is cloned
    #[arg(long, value_enum, default_value = "local")]
    repo_scope: Scope,

    /// Where MCP configuration is written
    #[arg(long, value_enum, default_value = "local")]
    mcp_scope: Scope,

    /// Copy skills bundled in the repository into host skills directories
    #[arg(long)]
    with_skills: bool,

    /// Where bundled skills are copied when --with-skills is set
    #[arg(long, value_enum, default_value = "local")]
    skills_scope: Scope,

    /// Host application to target; repeatable, defaults to every catalog host
    #[arg(long = "host", value_name = "ID")]
    hosts: Vec<String>,
}

impl GitMcpCommand {
    pub async fn execute(&self, context: &RunContext) -> Result<()> {
        let hosts = super::select_hosts(&context.catalog, &self.hosts)?;
        let mcp_scope = super::install::effective_mcp_scope(self.mcp_scope, &context.catalog);

        process::ensure_git_available()?;

        let repo_dirs = paths::repo_dirs(self.repo_scope, &context.project_root)?;
        let repo_dir = repo_dirs.mcp_repos.join(&self.name);

        super::info(format!("Ensuring repository at {}...", repo_dir.display()));
        let outcome = git::ensure_repo(&SystemRunner, &self.url, &repo_dir).await?;
        super::success(format!("Repository {} at {}", outcome.action.label(), repo_dir.display()));

        if !self.build_commands.is_empty() {
            super::info("Running build commands...");
            git::run_build_commands(&SystemRunner, &repo_dir, &self.build_commands).await?;
        }

        let server = self.server_definition(&repo_dir);

        super::info(format!(
            "Updating MCP configurations ({} scope)...",
            mcp_scope.label()
        ));
        let mut updated = 0;
        for host in &hosts {
            let host_paths = &context.host_paths[&host.id];
            let config_path = host_paths.mcp_config_for(mcp_scope);
            let server_key = host_paths.server_key_for(mcp_scope);

            match mcp::install_servers(config_path, std::slice::from_ref(&server), server_key) {
                Ok(result) => {
                    if let Some(backup) = result.recovered_backup {
                        super::warn(format!(
                            "{}: existing config was not valid JSON; original saved to {}",
                            host.display_name,
                            backup.display()
                        ));
                    }
                    updated += 1;
                }
                Err(err) => {
                    super::failure(format!(
                        "{}: failed to update MCP config: {err:#}",
                        host.display_name
                    ));
                }
            }
        }
        super::success(format!(
            "MCP server '{}' configured in {updated} host application(s).",
            self.name
        ));

        if self.with_skills {
            self.copy_bundled_skills(context, &hosts, &repo_dir)?;
        }

        super::info("Restart your host application to load the new MCP server.");
        Ok(())
    }

    /// Builds the server entry the hosts will record.
    ///
    /// A relative first argument names an entry point inside the clone, so
    /// it is joined onto the repository path; remaining arguments pass
    /// through verbatim.
    fn server_definition(&self, repo_dir: &Path) -> ServerDefinition {
        let mut args: Vec<String> =
            self.args.split_whitespace().map(str::to_string).collect();
        if let Some(first) = args.first_mut() {
            if !Path::new(first.as_str()).is_absolute() {
                *first = repo_dir.join(first.as_str()).display().to_string();
            }
        }

        ServerDefinition {
            name: self.name.clone(),
            description: None,
            command: self.command.clone(),
            args,
            env: None,
            cwd: None,
            server_type: Some(self.transport.clone()),
        }
    }

    fn copy_bundled_skills(
        &self,
        context: &RunContext,
        hosts: &[&crate::catalog::HostApplication],
        repo_dir: &Path,
    ) -> Result<()> {
        let Some(source) = git::find_skills_dir(repo_dir, git::SKILLS_DIR_CANDIDATES) else {
            super::info("Repository bundles no skills; nothing to copy.");
            return Ok(());
        };

        for host in hosts {
            let base = context.host_paths[&host.id]
                .skills_dir_for(self.skills_scope)
                .to_path_buf();
            let target = match (&context.catalog.skills_folder, host.nest_skills) {
                (Some(folder), true) => base.join(folder),
                _ => base,
            };
            git::copy_skills(&source, &target)?;
        }

        super::success(format!(
            "Bundled skills copied to {} host location(s).",
            hosts.len()
        ));
        Ok(())
    }
}
