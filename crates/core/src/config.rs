//! Configuration for recursive wrapper updates

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names probed in the root build directory
pub const CONFIG_FILE_NAMES: [&str; 2] = [".recursive-wrapper.json", "recursive-wrapper.json"];

/// Environment variable that sets the testing flag, like `-Drecursive-wrapper.testing`
pub const TESTING_ENV: &str = "RECURSIVE_WRAPPER_TESTING";

pub const DEFAULT_PLUGIN_ID: &str = "io.github.recursive-wrapper";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Name of the wrapper task, without the leading colon
    #[serde(default = "default_task")]
    pub task: String,

    /// Run sibling included builds concurrently
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub plugin: PluginCoordinates,
}

/// Coordinates of the plugin injected into included builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PluginCoordinates {
    pub id: String,
    pub version: String,
    /// Defaults to the plugin id, as for plugin marker artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Defaults to `<id>.gradle.plugin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl PluginCoordinates {
    /// `group:artifact:version` dependency notation
    pub fn notation(&self) -> String {
        let group = self.group.as_deref().unwrap_or(&self.id);
        let artifact = self
            .artifact
            .clone()
            .unwrap_or_else(|| format!("{}.gradle.plugin", self.id));
        format!("{group}:{artifact}:{}", self.version)
    }
}

impl Default for PluginCoordinates {
    fn default() -> Self {
        Self {
            id: DEFAULT_PLUGIN_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            group: None,
            artifact: None,
        }
    }
}

fn default_task() -> String {
    "wrapper".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task: default_task(),
            parallel: false,
            plugin: PluginCoordinates::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config of a root build, falling back to defaults when there is none
    pub fn load_for_build(build_dir: &Path) -> Result<Self> {
        match Self::find_config_file(build_dir) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn find_config_file(build_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| build_dir.join(name))
            .find(|path| path.exists())
    }

    /// Task path in the root project, e.g. `:wrapper`
    pub fn task_path(&self) -> String {
        format!(":{}", self.task)
    }

    fn validate(&self) -> Result<()> {
        if self.task.is_empty() || self.task.contains(':') {
            return Err(Error::ConfigError(format!(
                "Invalid task name '{}', expected a plain name such as 'wrapper'",
                self.task
            )));
        }
        if self.plugin.id.is_empty() || self.plugin.version.is_empty() {
            return Err(Error::ConfigError(
                "Plugin coordinates need both an id and a version".to_string(),
            ));
        }
        Ok(())
    }
}

/// Testing flag from the environment
pub fn testing_from_env() -> bool {
    std::env::var_os(TESTING_ENV).is_some()
}
