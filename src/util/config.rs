//! Configuration file support for cbuild.
//!
//! Two configuration file locations are read:
//! - Global: `~/.cbuild/config.toml` - User-wide defaults
//! - Project: `cbuild.toml` in the project root - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "cbuild.toml";

pub const DEFAULT_SOURCE_DIR: &str = "code";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_MAIN_SOURCE: &str = "main.cpp";
pub const DEFAULT_SOURCE_EXT: &str = "cpp";
pub const DEFAULT_OBJECT_EXT: &str = "o";
pub const DEFAULT_OUTPUT: &str = "main";

/// cbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
///
/// Unset keys fall back to the `DEFAULT_*` constants when the build options
/// are resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding one sub-directory per module
    pub source_dir: Option<PathBuf>,

    /// Directory receiving object files and the final executable
    pub build_dir: Option<PathBuf>,

    /// Translation unit holding `main`, linked against every module
    pub main_source: Option<PathBuf>,

    /// Compiler driver (e.g. g++, clang++)
    pub compiler: Option<String>,

    /// Extension of module sources, without the dot
    pub source_ext: Option<String>,

    /// Extension of object files, without the dot
    pub object_ext: Option<String>,

    /// Executable name, placed in the build directory
    pub output: Option<String>,

    /// Extra flags passed to every compiler invocation
    pub flags: Option<Vec<String>>,

    /// Per-invocation timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Always emit compile_commands.json
    pub emit_compile_commands: Option<bool>,
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
        let build = other.build;

        if build.source_dir.is_some() {
            self.build.source_dir = build.source_dir;
        }
        if build.build_dir.is_some() {
            self.build.build_dir = build.build_dir;
        }
        if build.main_source.is_some() {
            self.build.main_source = build.main_source;
        }
        if build.compiler.is_some() {
            self.build.compiler = build.compiler;
        }
        if build.source_ext.is_some() {
            self.build.source_ext = build.source_ext;
        }
        if build.object_ext.is_some() {
            self.build.object_ext = build.object_ext;
        }
        if build.output.is_some() {
            self.build.output = build.output;
        }
        if build.flags.is_some() {
            self.build.flags = build.flags;
        }
        if build.timeout_secs.is_some() {
            self.build.timeout_secs = build.timeout_secs;
        }
        if build.emit_compile_commands.is_some() {
            self.build.emit_compile_commands = build.emit_compile_commands;
        }
    }
}

/// Get the global cbuild config directory (~/.cbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cbuild"))
}

/// Get the project config path (`<root>/cbuild.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (cbuild.toml)
/// 2. Global config (~/.cbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.compiler.is_none());
        assert!(config.build.flags.is_none());
        assert!(config.build.emit_compile_commands.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("cbuild.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
source_dir = "sample/code"
build_dir = "sample/build"
compiler = "clang++"
flags = ["-O2", "-Wall"]
timeout_secs = 60
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.source_dir, Some(PathBuf::from("sample/code")));
        assert_eq!(config.build.compiler, Some("clang++".to_string()));
        assert_eq!(
            config.build.flags,
            Some(vec!["-O2".to_string(), "-Wall".to_string()])
        );
        assert_eq!(config.build.timeout_secs, Some(60));
        assert!(config.build.output.is_none());
    }

    #[test]
    fn test_config_load_rejects_bad_types() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("cbuild.toml");
        std::fs::write(&config_path, "[build]\ntimeout_secs = \"soon\"\n").unwrap();

        let err = Config::load(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config file"));
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.compiler = Some("g++".to_string());
        base.build.flags = Some(vec!["-O0".to_string()]);
        base.build.timeout_secs = Some(30);

        let mut override_cfg = Config::default();
        override_cfg.build.compiler = Some("clang++".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.compiler, Some("clang++".to_string()));
        assert_eq!(base.build.flags, Some(vec!["-O0".to_string()])); // Not overridden
        assert_eq!(base.build.timeout_secs, Some(30));
    }

    #[test]
    fn test_load_config_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("cbuild.toml");

        std::fs::write(&global, "[build]\ncompiler = \"g++\"\nobject_ext = \"obj\"\n").unwrap();
        std::fs::write(&project, "[build]\ncompiler = \"clang++\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.compiler, Some("clang++".to_string()));
        assert_eq!(config.build.object_ext, Some("obj".to_string()));
    }

    #[test]
    fn test_project_config_can_turn_global_settings_off() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("cbuild.toml");

        std::fs::write(
            &global,
            "[build]\nflags = [\"-O0\"]\nemit_compile_commands = true\n",
        )
        .unwrap();
        std::fs::write(
            &project,
            "[build]\nflags = []\nemit_compile_commands = false\n",
        )
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.flags, Some(Vec::new()));
        assert_eq!(config.build.emit_compile_commands, Some(false));

        // an absent key still inherits
        std::fs::write(&project, "[build]\ncompiler = \"clang++\"\n").unwrap();
        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.flags, Some(vec!["-O0".to_string()]));
        assert_eq!(config.build.emit_compile_commands, Some(true));
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("cbuild.toml"));
        assert_eq!(config, Config::default());
    }
}
