//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.cmake-pilot/config.toml` - User-wide defaults
//! - Project: `<root>/.cmake-pilot/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::target::{Architecture, Configuration};

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".cmake-pilot";

/// Default debug adapter flavor.
pub const DEFAULT_DEBUGGER: &str = "cppdbg";

/// Default session name.
pub const DEFAULT_SESSION_NAME: &str = "cmake-pilot";

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generate/build settings
    pub build: BuildConfig,

    /// Launch settings
    pub run: RunConfig,

    /// Shell session settings
    pub shell: ShellConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build directory, relative to the project root
    pub build_dir: Option<PathBuf>,

    /// CMake program to invoke
    pub cmake: Option<PathBuf>,

    /// Default configuration (debug, release)
    pub configuration: Option<String>,

    /// Default architecture (x86, x64)
    pub arch: Option<String>,
}

/// Launch-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Debug adapter flavor written into launch descriptors
    pub debugger: Option<String>,
}

/// Shell session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell program hosting the session
    pub program: Option<String>,

    /// Session name
    pub name: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }
        if other.build.configuration.is_some() {
            self.build.configuration = other.build.configuration;
        }
        if other.build.arch.is_some() {
            self.build.arch = other.build.arch;
        }

        if other.run.debugger.is_some() {
            self.run.debugger = other.run.debugger;
        }

        if other.shell.program.is_some() {
            self.shell.program = other.shell.program;
        }
        if other.shell.name.is_some() {
            self.shell.name = other.shell.name;
        }
    }

    /// The build directory for a project rooted at `root`.
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        match &self.build.build_dir {
            Some(dir) => root.join(dir),
            None => root.join("build"),
        }
    }

    /// Parse the configured default configuration.
    pub fn configuration(&self) -> Option<Configuration> {
        self.build.configuration.as_ref().and_then(|s| s.parse().ok())
    }

    /// Parse the configured default architecture.
    pub fn arch(&self) -> Option<Architecture> {
        self.build.arch.as_ref().and_then(|s| s.parse().ok())
    }

    pub fn debugger(&self) -> &str {
        self.run.debugger.as_deref().unwrap_or(DEFAULT_DEBUGGER)
    }

    pub fn shell_program(&self) -> &str {
        self.shell.program.as_deref().unwrap_or("sh")
    }

    pub fn session_name(&self) -> &str {
        self.shell.name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}

/// Get the global config directory (~/.cmake-pilot).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.cmake-pilot/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.cmake-pilot/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cmake-pilot/config.toml)
/// 2. Global config (~/.cmake-pilot/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}
