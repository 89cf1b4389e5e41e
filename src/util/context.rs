//! Global context for cbuild operations.
//!
//! Provides centralized access to the project root and configuration paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};

/// Environment variable overriding the global config directory.
pub const CBUILD_HOME_ENV: &str = "CBUILD_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root (current directory unless overridden with -C)
    project_root: PathBuf,

    /// Home directory for global cbuild data (~/.cbuild/)
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_root(cwd))
    }

    /// Create a context rooted at `project_dir`, or the current directory.
    pub fn from_project_dir(project_dir: Option<PathBuf>) -> Result<Self> {
        match project_dir {
            Some(dir) => {
                let root = dir
                    .canonicalize()
                    .with_context(|| format!("project directory not found: {}", dir.display()))?;
                Ok(Self::with_root(root))
            }
            None => Self::new(),
        }
    }

    /// Create a context with a specific project root.
    pub fn with_root(project_root: PathBuf) -> Self {
        let home = std::env::var_os(CBUILD_HOME_ENV)
            .map(PathBuf::from)
            .or_else(config::global_config_dir);

        GlobalContext { project_root, home }
    }

    /// Get the project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the global config file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Get the project config file path.
    pub fn project_config_path(&self) -> PathBuf {
        config::project_config_path(&self.project_root)
    }

    /// Load the merged global + project configuration.
    pub fn load_config(&self) -> Config {
        config::load_config(self.config_path().as_deref(), &self.project_config_path())
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
