//! `skillkit uninstall` - symmetric removal of installed artifacts.

use super::RunContext;
use crate::mcp;
use crate::paths::Scope;
use crate::skills::{self, SkillTarget};
use anyhow::Result;
use clap::Args;

/// Remove skills and MCP server entries installed by this tool.
#[derive(Args)]
pub struct UninstallCommand {
    /// Host application to target; repeatable, defaults to every catalog host
    #[arg(long = "host", value_name = "ID")]
    hosts: Vec<String>,

    /// Where skills were installed
    #[arg(long, value_enum, default_value = "local")]
    skills_scope: Scope,

    /// Where MCP configuration was written
    #[arg(long, value_enum, default_value = "local")]
    mcp_scope: Scope,

    /// Remove skills only, leave MCP configuration alone
    #[arg(long, conflicts_with = "mcp_only")]
    skills_only: bool,

    /// Remove MCP entries only, leave skills alone
    #[arg(long, conflicts_with = "skills_only")]
    mcp_only: bool,
}

impl UninstallCommand {
    pub async fn execute(&self, context: &RunContext) -> Result<()> {
        let hosts = super::select_hosts(&context.catalog, &self.hosts)?;
        let mcp_scope = super::install::effective_mcp_scope(self.mcp_scope, &context.catalog);

        if !self.mcp_only {
            let targets: Vec<SkillTarget> = hosts
                .iter()
                .map(|host| SkillTarget {
                    path: context.host_paths[&host.id]
                        .skills_dir_for(self.skills_scope)
                        .to_path_buf(),
                    nest: host.nest_skills,
                })
                .collect();

            match skills::uninstall(
                &context.catalog.skills,
                &targets,
                context.catalog.skills_folder.as_deref(),
                &context.catalog.usage_guide,
            ) {
                Ok(report) => super::success(format!(
                    "Removed {} skill folder(s) from {} host location(s).",
                    report.removed,
                    targets.len()
                )),
                Err(err) => {
                    super::failure(format!("Failed to remove skills: {err:#}"));
                }
            }
        }

        if !self.skills_only {
            self.uninstall_mcp(context, &hosts, mcp_scope);
        }

        super::success("Uninstall complete.");
        Ok(())
    }

    /// Removes managed entries host by host; a failing host is reported
    /// and its siblings still proceed.
    fn uninstall_mcp(
        &self,
        context: &RunContext,
        hosts: &[&crate::catalog::HostApplication],
        mcp_scope: Scope,
    ) {
        let names: Vec<String> = context
            .catalog
            .mcp_servers
            .iter()
            .map(|server| server.name.clone())
            .collect();

        let mut removed = 0;
        for host in hosts {
            let host_paths = &context.host_paths[&host.id];
            let config_path = host_paths.mcp_config_for(mcp_scope);
            let server_key = host_paths.server_key_for(mcp_scope);

            match mcp::uninstall_servers(config_path, &names, server_key) {
                Ok(outcome) => removed += outcome.removed,
                Err(err) => {
                    super::failure(format!(
                        "{}: failed to update MCP config: {err:#}",
                        host.display_name
                    ));
                }
            }
        }

        if removed > 0 {
            super::success(format!(
                "Removed {removed} MCP entries from {} host application(s) ({} scope).",
                hosts.len(),
                mcp_scope.label()
            ));
        } else {
            super::success("No matching MCP entries found to remove.");
        }
    }
}
