//! The declarative catalog: host applications, skills, and MCP servers.
//!
//! Everything the installer knows about its targets and its payload is
//! plain data, parsed once at startup from an embedded TOML document (or a
//! user-supplied override file) into immutable structs. Supporting a new
//! host application means adding a `[[hosts]]` table, not a code path.
//!
//! # Catalog format
//!
//! ```toml
//! skills-folder = "skillkit"
//! usage-guide = "SKILLS-GUIDE.md"
//! support-local-mcp = true
//!
//! [[hosts]]
//! id = "claude"
//! display-name = "Claude Code"
//! skills-path = ".claude/skills"
//! mcp-config-file = ".mcp.json"
//! global-mcp-config-file = "Claude/mcp.json"   # app-support relative
//! mcp-server-key = "mcpServers"
//! global-mcp-server-key = "mcpServers"
//! nest-skills = true
//!
//! [[skills]]
//! npm-name = "code-review-skill"
//! name = "Code Review"
//!
//! [[mcp-servers]]
//! name = "filesystem"
//! command = "npx"
//! args = ["-y", "@modelcontextprotocol/server-filesystem", "."]
//! ```
//!
//! Hosts may declare different server keys for project-level and user-level
//! configuration; both are carried through unchanged as opaque strings.

use crate::core::SkillkitError;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default catalog shipped inside the binary.
const BUILTIN_CATALOG: &str = include_str!("../../catalog.toml");

/// Placeholder in server args expanded to the resolved skills repo dir.
pub const REPO_DIR_PLACEHOLDER: &str = "{repoDir}";
/// Placeholder in server args expanded to the resolved MCP repo dir.
pub const MCP_REPO_DIR_PLACEHOLDER: &str = "{mcpRepoDir}";

/// A target editor or tool capable of hosting skills and MCP servers.
///
/// Loaded once per run from the catalog and never mutated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HostApplication {
    /// Stable identifier used on the command line (e.g. "claude")
    pub id: String,
    /// Human-readable name for status output
    pub display_name: String,
    /// Skills directory template, joined under home (global) or the
    /// project root (local)
    pub skills_path: String,
    /// Project-level MCP config file template, joined under the project
    /// root; also the home-relative fallback for user scope
    pub mcp_config_file: String,
    /// User-level MCP config file relative to the application-support
    /// root; when absent, user scope falls back to `<home>/<mcp_config_file>`
    #[serde(default)]
    pub global_mcp_config_file: Option<String>,
    /// JSON key holding the server map in project-level config
    pub mcp_server_key: String,
    /// JSON key holding the server map in user-level config
    pub global_mcp_server_key: String,
    /// Whether skills install under the shared catalog subfolder
    #[serde(default)]
    pub nest_skills: bool,
}

/// A named documentation bundle, distributed as an npm package.
///
/// Either a bare package name or a record with display metadata. Identity
/// is the npm package name in both forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Skill {
    /// Bare package name
    Name(String),
    /// Package name plus display metadata
    #[serde(rename_all = "kebab-case")]
    Detailed {
        /// npm package name (identity)
        npm_name: String,
        /// Display name
        #[serde(default)]
        name: Option<String>,
        /// One-line description for listings
        #[serde(default)]
        description: Option<String>,
    },
}

impl Skill {
    /// The npm package name, the skill's identity.
    #[must_use]
    pub fn npm_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { npm_name, .. } => npm_name,
        }
    }

    /// Display name for listings; falls back to the package name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { name, npm_name, .. } => name.as_deref().unwrap_or(npm_name),
        }
    }

    /// On-disk folder name: the package name with any trailing "-skill"
    /// suffix stripped.
    #[must_use]
    pub fn folder_name(&self) -> &str {
        let name = self.npm_name();
        name.strip_suffix("-skill").unwrap_or(name)
    }
}

/// An MCP server definition to be recorded in host configuration.
///
/// Identity is `name`, unique within a single host config's server key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerDefinition {
    /// Server name, the key under which the entry is stored
    pub name: String,
    /// One-line description for listings; never written to host config
    #[serde(default)]
    pub description: Option<String>,
    /// Program the host launches to start the server
    pub command: String,
    /// Arguments passed to the command
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables set when running the server
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
    /// Working directory for the server process
    #[serde(default)]
    pub cwd: Option<String>,
    /// Transport type (e.g. "stdio")
    #[serde(default, rename = "type")]
    pub server_type: Option<String>,
}

impl ServerDefinition {
    /// Expands `{repoDir}` / `{mcpRepoDir}` placeholders in the argument
    /// list against the resolved repository directories.
    #[must_use]
    pub fn resolve_placeholders(&self, repo_dir: &Path, mcp_repo_dir: &Path) -> Self {
        let repo = repo_dir.display().to_string();
        let mcp_repo = mcp_repo_dir.display().to_string();
        let mut resolved = self.clone();
        resolved.args = self
            .args
            .iter()
            .map(|arg| {
                arg.replace(REPO_DIR_PLACEHOLDER, &repo)
                    .replace(MCP_REPO_DIR_PLACEHOLDER, &mcp_repo)
            })
            .collect();
        resolved
    }
}

/// The complete catalog: hosts, skills, servers, and shared settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Catalog {
    /// Shared subfolder skills nest under for hosts with `nest_skills`
    #[serde(default)]
    pub skills_folder: Option<String>,
    /// File name the usage guide is deposited as in each skills directory
    #[serde(default = "default_usage_guide")]
    pub usage_guide: String,
    /// Whether project-level MCP config installation is offered
    #[serde(default = "default_true")]
    pub support_local_mcp: bool,
    /// Host application table
    pub hosts: Vec<HostApplication>,
    /// Skill payload
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// MCP server payload
    #[serde(default, rename = "mcp-servers")]
    pub mcp_servers: Vec<ServerDefinition>,
}

fn default_usage_guide() -> String {
    "SKILLS-GUIDE.md".to_string()
}

const fn default_true() -> bool {
    true
}

impl Catalog {
    /// Parses the catalog embedded in the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG, "<builtin>")
    }

    /// Loads a catalog override from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = crate::utils::read_text_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(content).map_err(|err| SkillkitError::CatalogParseError {
            file: origin.to_string(),
            reason: err.to_string(),
        })?;

        if catalog.hosts.is_empty() {
            return Err(SkillkitError::CatalogParseError {
                file: origin.to_string(),
                reason: "catalog defines no host applications".to_string(),
            }
            .into());
        }

        Ok(catalog)
    }

    /// Looks up a host application by id.
    pub fn host(&self, id: &str) -> Result<&HostApplication> {
        self.hosts.iter().find(|host| host.id == id).ok_or_else(|| {
            SkillkitError::HostNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }

    /// All host ids, in catalog order.
    #[must_use]
    pub fn host_ids(&self) -> Vec<String> {
        self.hosts.iter().map(|host| host.id.clone()).collect()
    }
}
