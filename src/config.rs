use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::docker::BuildConfig;
use crate::error::{Result, TagshipError};

/// File name of the per-project configuration
pub const PROJECT_CONFIG_FILE: &str = "tagship.toml";

/// Represents the complete configuration for tagship.
///
/// Contains the release settings (`[git]`) and the image build settings
/// (`[docker]`). Every field has a default, an empty file is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub docker: BuildConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_version_file() -> PathBuf {
    PathBuf::from("VERSION.txt")
}

/// Release settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    /// Remote tags are fetched from and pushed to
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Changelog file, searched for in the project directory when unset
    #[serde(default)]
    pub changelog: Option<PathBuf>,

    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            changelog: None,
            version_file: default_version_file(),
        }
    }
}

impl Config {
    /// Changelog file or directory to search, resolved against the project
    pub fn changelog_path(&self, project_dir: &Path) -> PathBuf {
        match &self.git.changelog {
            Some(path) => project_dir.join(path),
            None => project_dir.to_path_buf(),
        }
    }

    pub fn version_file_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.git.version_file)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `tagship.toml` in the project directory
/// 3. `tagship/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `project_dir` - The project the configuration applies to
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err(Config)` - If a file exists but cannot be read or parsed, or the
///   custom path does not exist
pub fn load_config(project_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if project_dir.join(PROJECT_CONFIG_FILE).is_file() {
        project_dir.join(PROJECT_CONFIG_FILE)
    } else if let Some(path) = dirs::config_dir()
        .map(|dir| dir.join("tagship").join("config.toml"))
        .filter(|path| path.is_file())
    {
        path
    } else {
        log::debug!("No configuration file found, using defaults");
        return Ok(Config::default());
    };

    log::debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(&path).map_err(|e| {
        TagshipError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&content)
        .map_err(|e| TagshipError::config(format!("{}: {}", path.display(), e)))
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}
