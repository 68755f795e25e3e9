//! Engine configuration (reskin.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by both phases
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Shared plugin-data namespace holding token metadata
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Key under `namespace` holding the token bundle JSON
    #[serde(default = "default_key")]
    pub key: String,
    /// Prefix of icon-swap variable names (`icons/<node name>`)
    #[serde(default = "default_icon_path")]
    pub icon_path: String,
    /// Prefix of component-swap variable names (`components/<node name>`)
    #[serde(default = "default_component_path")]
    pub component_path: String,
    /// Library collections that make up a theme
    #[serde(default = "default_theme_collections")]
    pub theme_collections: Vec<String>,
    /// Collection of swap variables, left out of variable listings
    #[serde(default = "default_swap_collection")]
    pub swap_collection: String,
    /// Path segment prefix that marks a spacing variable
    #[serde(default = "default_spacing_pattern")]
    pub spacing_pattern: String,
    /// Mode a freshly created local collection starts with
    #[serde(default = "default_mode_name")]
    pub default_mode_name: String,
    /// Deferral before the heavy pass starts, in milliseconds
    #[serde(default = "default_defer_ms")]
    pub defer_ms: u64,
}

fn default_namespace() -> String {
    "elc_admin".to_string()
}

fn default_key() -> String {
    "tokens".to_string()
}

fn default_icon_path() -> String {
    "icons/".to_string()
}

fn default_component_path() -> String {
    "components/".to_string()
}


fn default_theme_collections() -> Vec<String> {
    ["0.presentation", "1.theme", "2.responsive", "3.swap"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_swap_collection() -> String {
    "3.swap".to_string()
}

fn default_spacing_pattern() -> String {
    "spacing".to_string()
}

fn default_mode_name() -> String {
    "Mode 1".to_string()
}

fn default_defer_ms() -> u64 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            key: default_key(),
            icon_path: default_icon_path(),
            component_path: default_component_path(),
            theme_collections: default_theme_collections(),
            swap_collection: default_swap_collection(),
            spacing_pattern: default_spacing_pattern(),
            default_mode_name: default_mode_name(),
            defer_ms: default_defer_ms(),
        }
    }
}

impl EngineConfig {
    /// Load from a file, or from `reskin.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_path = if path.is_dir() {
            path.join("reskin.toml")
        } else {
            path.to_path_buf()
        };

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<string>".to_string(),
            source,
        })
    }

    pub fn defer(&self) -> Duration {
        Duration::from_millis(self.defer_ms)
    }

    /// Whether a variable name follows the spacing naming convention
    pub fn is_spacing_variable(&self, name: &str) -> bool {
        let pattern = self.spacing_pattern.to_lowercase();
        name.split('/')
            .any(|segment| segment.trim().to_lowercase().starts_with(&pattern))
    }

    /// Whether variables of the collection `name` are listed: theme collections minus swaps
    pub fn lists_collection(&self, name: &str) -> bool {
        name != self.swap_collection && self.theme_collections.iter().any(|c| c == name)
    }

    pub fn icon_variable_name(&self, node_name: &str) -> String {
        format!("{}{}", self.icon_path, node_name)
    }

    pub fn component_variable_name(&self, node_name: &str) -> String {
        format!("{}{}", self.component_path, node_name)
    }
}
