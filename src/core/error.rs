//! Error types and user-facing error presentation for skillkit.
//!
//! Domain failures are modeled as [`SkillkitError`] variants and propagated
//! through `anyhow::Result` so call sites can attach context with
//! `.with_context(...)`. At the top of the program, [`user_friendly_error`]
//! translates whatever bubbled up into an [`ErrorContext`] with an optional
//! suggestion and details, which [`ErrorContext::display`] renders on stderr.
//!
//! The taxonomy follows the installer's failure policy:
//!
//! - Expected absence (missing config file, already-removed temp dir) is not
//!   an error and never reaches this module.
//! - Recoverable corruption (unparsable config) is handled in-place by the
//!   merge engine and only surfaces here as a warning, not a failure.
//! - Fatal conditions (external process non-zero exit, impossible
//!   fast-forward, non-repo target directory) abort the step they belong to
//!   and are represented by the variants below.

use colored::Colorize;
use thiserror::Error;

/// Domain errors for skill and MCP provisioning operations.
#[derive(Error, Debug, Clone)]
pub enum SkillkitError {
    /// An external process exited with a non-zero status.
    ///
    /// Carries the program name, the logical operation that was running
    /// (e.g. "npm install", "git pull"), and the captured stderr so the
    /// failure can be reported without re-running anything.
    #[error("{program} {operation} failed")]
    CommandFailed {
        /// Program that was invoked (e.g. "git", "npm")
        program: String,
        /// Logical operation for error messages (e.g. "clone", "install")
        operation: String,
        /// Captured standard error output
        stderr: String,
    },

    /// An external process exceeded its timeout and was terminated.
    #[error("{program} {operation} timed out after {seconds}s")]
    CommandTimeout {
        /// Program that was invoked
        program: String,
        /// Logical operation that timed out
        operation: String,
        /// Timeout that was exceeded, in seconds
        seconds: u64,
    },

    /// Git executable not found in PATH.
    #[error("git is not installed or not found in PATH")]
    GitNotFound,

    /// npm executable not found in PATH.
    #[error("npm is not installed or not found in PATH")]
    NpmNotFound,

    /// Repository clone failed.
    #[error("failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// Error output from git
        reason: String,
    },

    /// A fast-forward-only update was not possible.
    ///
    /// The local clone has diverged from its remote. The repository is left
    /// untouched; it is never force-reset.
    #[error("cannot fast-forward repository at {path}")]
    FastForwardFailed {
        /// Path of the repository that could not be updated
        path: String,
        /// Error output from git
        reason: String,
    },

    /// The target directory exists but is not a git repository.
    ///
    /// Refusing to clone over unrelated content protects whatever the user
    /// already has at that path.
    #[error("target exists but is not a git repository: {path}")]
    NotAGitRepo {
        /// The offending directory
        path: String,
    },

    /// Catalog file could not be parsed.
    #[error("invalid catalog file: {file}")]
    CatalogParseError {
        /// Path (or "<builtin>") of the catalog that failed to parse
        file: String,
        /// Parser error detail
        reason: String,
    },

    /// A host application id was requested that the catalog does not define.
    #[error("unknown host application: {id}")]
    HostNotFound {
        /// The unrecognized host id
        id: String,
    },

    /// Generic configuration error.
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// File system operation failed.
    #[error("file system error during {operation}: {path}")]
    FileSystemError {
        /// The operation that failed (e.g. "create directory")
        operation: String,
        /// The path involved
        path: String,
    },

    /// Permission denied accessing a path.
    #[error("permission denied during {operation}: {path}")]
    PermissionDenied {
        /// The operation that failed
        operation: String,
        /// The path involved
        path: String,
    },

    /// Catch-all for errors that have no dedicated variant.
    #[error("{0}")]
    Other(String),
}

/// An error paired with presentation hints for the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SkillkitError,
    /// Optional actionable suggestion, rendered in green
    pub suggestion: Option<String>,
    /// Optional extra detail, rendered in yellow
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SkillkitError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional detail about the failure.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Render the error to stderr.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

/// Translate an error chain into an [`ErrorContext`] with hints.
///
/// Known [`SkillkitError`] variants get targeted suggestions; bare I/O
/// errors get generic guidance; anything else is passed through with its
/// message intact.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(skillkit_error) = error.downcast_ref::<SkillkitError>() {
        return create_error_context(skillkit_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(SkillkitError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion(
                    "Check file ownership, or re-run with elevated permissions",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(SkillkitError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the path exists and is spelled correctly");
            }
            _ => {}
        }
    }

    ErrorContext::new(SkillkitError::Other(format!("{error:#}")))
}

fn create_error_context(error: SkillkitError) -> ErrorContext {
    match &error {
        SkillkitError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or via your package manager")
            .with_details("Cloning MCP server repositories requires the git CLI"),

        SkillkitError::NpmNotFound => ErrorContext::new(error)
            .with_suggestion("Install Node.js (which bundles npm) from https://nodejs.org/")
            .with_details("Skills are distributed as npm packages and fetched with npm"),

        SkillkitError::GitCloneFailed { url, reason } => {
            let details = reason.trim().to_string();
            let suggestion = if reason.contains("Authentication") || reason.contains("403") {
                format!("Check your credentials for {url}")
            } else {
                format!("Check that {url} is reachable and the URL is correct")
            };
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        SkillkitError::FastForwardFailed { path, .. } => {
            let path = path.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "The clone at {path} has local changes or diverged history; \
                 resolve it manually or remove the directory and re-run"
            ))
        }

        SkillkitError::NotAGitRepo { path } => {
            let path = path.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "Move or remove {path}, or pick a different clone location"
            ))
        }

        SkillkitError::CommandTimeout { program, .. } => {
            let program = program.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "Check your network connection, or run the {program} command manually to see \
                 where it hangs"
            ))
        }

        SkillkitError::CommandFailed { stderr, .. } => {
            let details = stderr.trim().to_string();
            let ctx = ErrorContext::new(error);
            if details.is_empty() {
                ctx
            } else {
                ctx.with_details(details)
            }
        }

        SkillkitError::HostNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Run with --help to see the host ids the catalog defines"),

        SkillkitError::CatalogParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Validate the catalog TOML syntax and field names"),

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_names_program_and_operation() {
        let err = SkillkitError::CommandFailed {
            program: "npm".to_string(),
            operation: "install".to_string(),
            stderr: "E404".to_string(),
        };
        assert_eq!(err.to_string(), "npm install failed");
    }

    #[test]
    fn user_friendly_error_maps_domain_errors() {
        let ctx = user_friendly_error(SkillkitError::GitNotFound.into());
        assert!(matches!(ctx.error, SkillkitError::GitNotFound));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn user_friendly_error_passes_through_unknown_errors() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(ctx.error.to_string().contains("something odd"));
    }

    #[test]
    fn command_failed_context_omits_empty_stderr_details() {
        let ctx = user_friendly_error(
            SkillkitError::CommandFailed {
                program: "git".to_string(),
                operation: "pull".to_string(),
                stderr: "  ".to_string(),
            }
            .into(),
        );
        assert!(ctx.details.is_none());
    }
}
