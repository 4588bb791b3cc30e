//! `skillkit install` - provision catalog skills and MCP servers.

use super::RunContext;
use crate::catalog::{ServerDefinition, Skill};
use crate::core::SkillkitError;
use crate::mcp;
use crate::paths::{self, Scope};
use crate::process::{self, SystemRunner};
use crate::skills::{self, SkillTarget};
use anyhow::Result;
use clap::Args;

/// Install skills and MCP server configurations into host applications.
#[derive(Args)]
pub struct InstallCommand {
    /// Host application to target; repeatable, defaults to every catalog host
    #[arg(long = "host", value_name = "ID")]
    hosts: Vec<String>,

    /// Where skills are installed
    #[arg(long, value_enum, default_value = "local")]
    skills_scope: Scope,

    /// Where MCP configuration is written
    #[arg(long, value_enum, default_value = "local")]
    mcp_scope: Scope,

    /// Install only these skills (by npm package name); defaults to all
    #[arg(long = "skill", value_name = "NAME")]
    skill_names: Vec<String>,

    /// Install only these MCP servers (by name); defaults to all
    #[arg(long = "server", value_name = "NAME")]
    server_names: Vec<String>,

    /// Skip MCP configuration, install skills only
    #[arg(long, conflicts_with = "mcp_only")]
    skills_only: bool,

    /// Skip skills, update MCP configuration only
    #[arg(long, conflicts_with = "skills_only")]
    mcp_only: bool,
}

impl InstallCommand {
    pub async fn execute(&self, context: &RunContext) -> Result<()> {
        let hosts = super::select_hosts(&context.catalog, &self.hosts)?;
        let mcp_scope = effective_mcp_scope(self.mcp_scope, &context.catalog);

        let skills = selected_skills(&context.catalog.skills, &self.skill_names)?;
        let servers = selected_servers(&context.catalog.mcp_servers, &self.server_names)?;

        // The skills step and the MCP step are independent; a failure in
        // one is reported and the other still runs.
        if !self.mcp_only {
            if let Err(err) = self.install_skills(context, &hosts, &skills).await {
                super::failure(format!("Failed to install skills: {err:#}"));
            }
        }

        if !self.skills_only {
            self.install_mcp(context, &hosts, &servers, mcp_scope)?;
        }

        super::success("All done. Re-run this command any time to refresh skills and configs.");
        Ok(())
    }

    async fn install_skills(
        &self,
        context: &RunContext,
        hosts: &[&crate::catalog::HostApplication],
        skills: &[Skill],
    ) -> Result<()> {
        process::ensure_npm_available()?;

        let targets: Vec<SkillTarget> = hosts
            .iter()
            .map(|host| SkillTarget {
                path: context.host_paths[&host.id]
                    .skills_dir_for(self.skills_scope)
                    .to_path_buf(),
                nest: host.nest_skills,
            })
            .collect();

        let staging = tempfile::Builder::new()
            .prefix("skillkit-")
            .tempdir()?
            .keep();

        super::info(format!(
            "Installing {} skill(s) from npm ({} scope)...",
            skills.len(),
            self.skills_scope.label()
        ));

        let result = skills::install(
            &SystemRunner,
            skills,
            &targets,
            &staging,
            context.catalog.skills_folder.as_deref(),
            &context.catalog.usage_guide,
        )
        .await;

        // Staging cleanup is attempted even when the install failed
        if let Err(err) = skills::cleanup_staging(&staging) {
            super::warn(format!("Could not remove staging directory: {err:#}"));
        }

        let report = result?;
        super::success(format!(
            "{} skill(s) installed to {} host location(s).",
            report.installed,
            targets.len()
        ));
        Ok(())
    }

    /// Updates each host's config independently; one failure does not stop
    /// the others.
    fn install_mcp(
        &self,
        context: &RunContext,
        hosts: &[&crate::catalog::HostApplication],
        servers: &[ServerDefinition],
        mcp_scope: Scope,
    ) -> Result<()> {
        let repo_dirs = paths::repo_dirs(mcp_scope, &context.project_root)?;
        let resolved: Vec<ServerDefinition> = servers
            .iter()
            .map(|server| {
                server.resolve_placeholders(&repo_dirs.skills_repo, &repo_dirs.mcp_repos)
            })
            .collect();

        super::info(format!(
            "Updating MCP configurations ({} scope)...",
            mcp_scope.label()
        ));

        let mut updated = 0;
        for host in hosts {
            let host_paths = &context.host_paths[&host.id];
            let config_path = host_paths.mcp_config_for(mcp_scope);
            let server_key = host_paths.server_key_for(mcp_scope);

            match mcp::install_servers(config_path, &resolved, server_key) {
                Ok(outcome) => {
                    if let Some(backup) = outcome.recovered_backup {
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
            "MCP configs updated for {updated} host application(s) ({} scope).",
            mcp_scope.label()
        ));
        Ok(())
    }
}

/// Local MCP installation can be disabled catalog-wide; global is then the
/// only valid scope.
pub(super) fn effective_mcp_scope(requested: Scope, catalog: &crate::catalog::Catalog) -> Scope {
    if requested == Scope::Local && !catalog.support_local_mcp {
        Scope::Global
    } else {
        requested
    }
}

pub(super) fn selected_skills(available: &[Skill], requested: &[String]) -> Result<Vec<Skill>> {
    if requested.is_empty() {
        return Ok(available.to_vec());
    }

    requested
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|skill| skill.npm_name() == name)
                .cloned()
                .ok_or_else(|| {
                    SkillkitError::ConfigError {
                        message: format!("catalog defines no skill named '{name}'"),
                    }
                    .into()
                })
        })
        .collect()
}

pub(super) fn selected_servers(
    available: &[ServerDefinition],
    requested: &[String],
) -> Result<Vec<ServerDefinition>> {
    if requested.is_empty() {
        return Ok(available.to_vec());
    }

    requested
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|server| server.name == *name)
                .cloned()
                .ok_or_else(|| {
                    SkillkitError::ConfigError {
                        message: format!("catalog defines no MCP server named '{name}'"),
                    }
                    .into()
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn skill_selection_filters_by_npm_name() {
        let catalog = Catalog::builtin().unwrap();
        let selected =
            selected_skills(&catalog.skills, &["code-review-skill".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].npm_name(), "code-review-skill");
    }

    #[test]
    fn unknown_skill_selection_is_rejected() {
        let catalog = Catalog::builtin().unwrap();
        assert!(selected_skills(&catalog.skills, &["nope".to_string()]).is_err());
    }

    #[test]
    fn server_selection_defaults_to_all() {
        let catalog = Catalog::builtin().unwrap();
        let selected = selected_servers(&catalog.mcp_servers, &[]).unwrap();
        assert_eq!(selected.len(), catalog.mcp_servers.len());
    }

    #[test]
    fn local_mcp_scope_falls_back_when_unsupported() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.support_local_mcp = false;
        assert_eq!(effective_mcp_scope(Scope::Local, &catalog), Scope::Global);
        assert_eq!(effective_mcp_scope(Scope::Global, &catalog), Scope::Global);

        catalog.support_local_mcp = true;
        assert_eq!(effective_mcp_scope(Scope::Local, &catalog), Scope::Local);
    }
}
