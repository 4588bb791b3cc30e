//! MCP server configuration management.
//!
//! Host applications record the MCP servers they may launch in a JSON
//! configuration file, under a host-specific key (e.g. `"mcpServers"` for
//! Claude Code and Cursor, `"servers"` for VS Code). This module owns the
//! merge and removal of the entries this tool manages while leaving every
//! other part of the document alone:
//!
//! - [`load_document`] tolerates a missing file (first install) and
//!   quarantines a corrupt one to a `.bak` sibling before proceeding with
//!   an empty document.
//! - [`merge_servers`] is a last-write-wins upsert keyed by server name:
//!   installing the same name twice, even with a different command, means
//!   "ensure this named server has this exact definition".
//! - [`remove_servers`] deletes by name and prunes the sub-object key once
//!   it empties, so repeated install/uninstall cycles do not accumulate
//!   empty objects in the user's config.
//! - [`install_servers`] / [`uninstall_servers`] wrap the above with the
//!   file handling: 2-space indentation, trailing newline, no write when
//!   nothing changed.
//!
//! Merging twice is equal to merging once, and for any document holding
//! keys other than the server key, those keys and their values survive
//! every operation here untouched.

use crate::catalog::ServerDefinition;
use crate::utils;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};


/// A host config document plus how it was obtained.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Top-level JSON object (empty for a missing or quarantined file)
    pub document: Map<String, Value>,
    /// Set when the on-disk content was unparsable and moved aside;
    /// holds the backup path the original bytes were copied to
    pub recovered_backup: Option<PathBuf>,
}

/// Outcome of a removal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Number of entries deleted
    pub removed: usize,
    /// Whether the document changed (callers skip the disk write if not)
    pub changed: bool,
}

/// Outcome of an install pass.
#[derive(Debug)]
pub struct InstallOutcome {
    /// Backup path when the prior config was quarantined as corrupt
    pub recovered_backup: Option<PathBuf>,
}

/// Loads a host configuration document.
///
/// A missing file is the expected first-install state and yields an empty
/// document. A present-but-unparsable file is never overwritten silently:
/// the original bytes are copied to `<path>.bak` (replacing any prior
/// backup) and an empty document is returned, with the backup path
/// reported so callers can tell the user what happened.
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    if !path.exists() {
        return Ok(LoadedDocument {
            document: Map::new(),
            recovered_backup: None,
        });
    }

    let raw = utils::read_text_file(path)?;
    if raw.trim().is_empty() {
        return Ok(LoadedDocument {
            document: Map::new(),
            recovered_backup: None,
        });
    }

    match serde_json::from_str::<Value>(&raw) {
        // A parseable non-object cannot hold a server map; treat it the
        // same as corruption so the user's content is preserved.
        Ok(Value::Object(document)) => Ok(LoadedDocument {
            document,
            recovered_backup: None,
        }),
        _ => {
            let backup = backup_path(path);
            std::fs::copy(path, &backup).with_context(|| {
                format!(
                    "Failed to back up unparsable config {} to {}",
                    path.display(),
                    backup.display()
                )
            })?;
            tracing::warn!(
                target: "mcp",
                "Config at {} is not valid JSON; original preserved at {}",
                path.display(),
                backup.display()
            );
            Ok(LoadedDocument {
                document: Map::new(),
                recovered_backup: Some(backup),
            })
        }
    }
}

/// Merges server definitions into a document under the given key.
///
/// Every key of the input other than `server_key` passes through
/// unchanged. Entries already present under `server_key` survive unless an
/// incoming server shares their name, in which case the incoming
/// definition wins.
#[must_use]
pub fn merge_servers(
    document: &Map<String, Value>,
    servers: &[ServerDefinition],
    server_key: &str,
) -> Map<String, Value> {
    let mut merged = document.clone();

    let mut entries = match merged.get(server_key) {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    };

    for server in servers {
        entries.insert(server.name.clone(), normalized_entry(server));
    }

    merged.insert(server_key.to_string(), Value::Object(entries));
    merged
}

/// Removes entries by name from the sub-object at `server_key`.
///
/// Prunes the sub-object key itself once it empties. When the key is
/// absent or not an object there is nothing this tool manages there: the
/// document is left untouched and `changed` is false.
pub fn remove_servers(
    document: &mut Map<String, Value>,
    names: &[String],
    server_key: &str,
) -> RemovalOutcome {
    let Some(Value::Object(entries)) = document.get_mut(server_key) else {
        return RemovalOutcome {
            removed: 0,
            changed: false,
        };
    };

    let mut removed = 0;
    for name in names {
        if entries.remove(name).is_some() {
            removed += 1;
        }
    }

    if removed == 0 {
        return RemovalOutcome {
            removed: 0,
            changed: false,
        };
    }

    if entries.is_empty() {
        document.remove(server_key);
    }

    RemovalOutcome {
        removed,
        changed: true,
    }
}

/// Loads, merges, and writes back a host configuration file.
///
/// Ensures the parent directory exists, then persists the merged document
/// with stable 2-space indentation and a single trailing newline.
pub fn install_servers(
    path: &Path,
    servers: &[ServerDefinition],
    server_key: &str,
) -> Result<InstallOutcome> {
    if let Some(parent) = path.parent() {
        utils::ensure_dir(parent)?;
    }

    let loaded = load_document(path)?;
    let merged = merge_servers(&loaded.document, servers, server_key);
    utils::write_json_document(path, &Value::Object(merged))?;

    Ok(InstallOutcome {
        recovered_backup: loaded.recovered_backup,
    })
}

/// Removes named entries from a host configuration file.
///
/// A missing file means there is nothing to remove; it is not created.
/// The file is rewritten only when an entry was actually deleted.
pub fn uninstall_servers(
    path: &Path,
    names: &[String],
    server_key: &str,
) -> Result<RemovalOutcome> {
    if !path.exists() {
        return Ok(RemovalOutcome {
            removed: 0,
            changed: false,
        });
    }

    let mut loaded = load_document(path)?;
    let outcome = remove_servers(&mut loaded.document, names, server_key);

    if outcome.changed {
        utils::write_json_document(path, &Value::Object(loaded.document))?;
    }

    Ok(outcome)
}

/// Builds the normalized JSON record for one server.
///
/// `command` and `args` are always present (args defaults to an empty
/// list); `env`, `cwd`, and `type` appear only when set on the input.
fn normalized_entry(server: &ServerDefinition) -> Value {
    let mut entry = Map::new();
    entry.insert("command".to_string(), Value::String(server.command.clone()));
    entry.insert(
        "args".to_string(),
        Value::Array(server.args.iter().map(|arg| Value::String(arg.clone())).collect()),
    );

    if let Some(env) = &server.env {
        entry.insert(
            "env".to_string(),
            Value::Object(
                env.iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect(),
            ),
        );
    }
    if let Some(cwd) = &server.cwd {
        entry.insert("cwd".to_string(), Value::String(cwd.clone()));
    }
    if let Some(server_type) = &server.server_type {
        entry.insert("type".to_string(), Value::String(server_type.clone()));
    }

    Value::Object(entry)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || "config".to_string(),
        |name| name.to_string_lossy().to_string(),
    );
    name.push_str(".bak");
    path.with_file_name(name)
}
