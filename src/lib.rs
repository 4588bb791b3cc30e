//! skillkit - provision agent skills and MCP server configurations across
//! host applications.
//!
//! skillkit installs a catalog of "skills" (documentation bundles
//! distributed as npm packages) and MCP server definitions into one or
//! more host applications (Claude Code, Cursor, Codex, VS Code), at
//! per-project or per-user scope, and removes them symmetrically. A
//! git-sourced path clones and optionally builds an MCP server repository
//! before recording it.
//!
//! # Architecture
//!
//! The catalog is declarative data loaded once per run; the engines below
//! it are pure functions over paths and documents plus a narrow
//! external-process boundary:
//!
//! - [`catalog`] - host applications, skills, and server definitions as an
//!   immutable configuration table
//! - [`platform`] - OS detection and the application-support root
//! - [`paths`] - per-host, per-scope path resolution (pure path arithmetic)
//! - [`mcp`] - JSON config merge engine: non-destructive, idempotent
//!   upsert/removal of the server entries this tool manages
//! - [`skills`] - npm-backed skill staging and artifact placement
//! - [`git`] - clone/fast-forward acquisition of git-sourced servers
//! - [`process`] - external-process execution with timeout and captured
//!   output, behind a runner trait the tests fake
//! - [`cli`] - the flag-driven command surface
//! - [`core`] - error taxonomy and user-facing error presentation
//! - [`utils`] - file system helpers (atomic writes, recursive copy)
//!
//! # Guarantees
//!
//! Host configuration files are edited, never owned: merge and removal
//! touch only the entries under the host's server key that this tool
//! manages, every other byte of meaning in the document survives, and a
//! corrupt config is quarantined to a `.bak` sibling rather than
//! destroyed. Install operations are idempotent; re-running converges to
//! the same state.

pub mod catalog;
pub mod cli;
pub mod core;
pub mod git;
pub mod mcp;
pub mod paths;
pub mod platform;
pub mod process;
pub mod skills;
pub mod utils;
