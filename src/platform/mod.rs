//! OS detection and platform-specific directory resolution.
//!
//! Host applications keep their user-level configuration under a
//! platform-specific "application support" root:
//!
//! | Platform | Root |
//! |----------|------|
//! | Windows  | `%APPDATA%` (fallback `<home>/AppData/Roaming`) |
//! | macOS    | `<home>/Library/Application Support` |
//! | Linux/BSD | `$XDG_CONFIG_HOME` (fallback `<home>/.config`) |
//!
//! Detection is pure given the compile target and environment; nothing in
//! this module touches the file system.

use anyhow::Result;
use std::path::PathBuf;

/// The detected operating system family.
///
/// Carried as plain data rather than re-checked with `cfg!` at each use
/// site so path resolution can be exercised for every platform in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// OS identifier as reported by the compile target (e.g. "linux")
    pub os: &'static str,
    /// True on any Windows target
    pub is_windows: bool,
    /// True on macOS
    pub is_mac: bool,
    /// True on Linux
    pub is_linux: bool,
}

impl Platform {
    /// Detects the platform the binary was compiled for.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: std::env::consts::OS,
            is_windows: cfg!(windows),
            is_mac: cfg!(target_os = "macos"),
            is_linux: cfg!(target_os = "linux"),
        }
    }

    /// Human-readable OS name for status output.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        if self.is_windows {
            "Windows"
        } else if self.is_mac {
            "macOS"
        } else if self.is_linux {
            "Linux"
        } else {
            self.os
        }
    }
}

/// Gets the home directory path for the current user.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if cfg!(windows) {
            "On Windows: check that the USERPROFILE environment variable is set"
        } else {
            "On Unix: check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Resolves the platform's application-support root directory.
///
/// Environment overrides (`%APPDATA%`, `$XDG_CONFIG_HOME`) win over the
/// home-relative fallbacks when set and non-empty.
pub fn app_support_root(platform: &Platform) -> Result<PathBuf> {
    if platform.is_windows {
        if let Some(appdata) = non_empty_env("APPDATA") {
            return Ok(PathBuf::from(appdata));
        }
        return Ok(home_dir()?.join("AppData").join("Roaming"));
    }

    if platform.is_mac {
        return Ok(home_dir()?.join("Library").join("Application Support"));
    }

    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg));
    }
    Ok(home_dir()?.join(".config"))
}

/// Returns the git executable name for the current platform.
#[must_use]
pub const fn git_program() -> &'static str {
    if cfg!(windows) {
        "git.exe"
    } else {
        "git"
    }
}

/// Returns the npm executable name for the current platform.
///
/// On Windows npm ships as a `.cmd` shim, not an `.exe`.
#[must_use]
pub const fn npm_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
