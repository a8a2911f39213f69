//! Tool configuration
//!
//! Stored in `~/.config/kbmanifest/config.yaml`. The location can be
//! overridden with `KBMANIFEST_CONFIG` or an explicit path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "KBMANIFEST_CONFIG";

/// The only configuration file format understood
pub const CONFIG_API_VERSION: &str = "kbmanifest.io/v1";

/// Configuration file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Configuration format, `kbmanifest.io/v1`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Extra directories holding kind tables
    #[serde(default)]
    pub schema_dirs: Vec<PathBuf>,

    /// Namespace applied to namespaced kinds when the configuration sets none
    #[serde(default)]
    pub default_namespace: Option<String>,
}

fn default_api_version() -> String {
    CONFIG_API_VERSION.to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            schema_dirs: Vec::new(),
            default_namespace: None,
        }
    }
}

impl ToolConfig {
    /// Load configuration from `KBMANIFEST_CONFIG` or the default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self =
            serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            })?;

        if config.api_version != CONFIG_API_VERSION {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "{}: unsupported apiVersion '{}', expected '{}'",
                    path.display(),
                    config.api_version,
                    CONFIG_API_VERSION
                ),
            });
        }

        // Relative schema directories are relative to the config file
        if let Some(base) = path.parent() {
            config.schema_dirs = config
                .schema_dirs
                .into_iter()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
                .collect();
        }

        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("kbmanifest").join("config.yaml"))
    }
}
