use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

pub const WORKSPACE_ID_ENV: &str = "AZURE_LOG_ANALYTICS_WORKSPACE_ID";
pub const RESOURCE_ID_ENV: &str = "AZURE_APP_INSIGHTS_RESOURCE_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logs: LogDefaults,
    pub docker: DockerSettings,
    pub kubernetes: KubernetesSettings,
    pub compose: ComposeSettings,
    pub azure: AzureSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDefaults {
    /// Lines requested from the end of every log stream.
    pub tail: u32,
}

impl Default for LogDefaults {
    fn default() -> Self {
        Self { tail: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    pub binary: String,
    /// Default daemon address, e.g. `ssh://user@remote` or `tcp://host:2375`.
    pub host: Option<String>,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            host: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSettings {
    pub binary: String,
    pub context: Option<String>,
    pub namespace: String,
}

impl Default for KubernetesSettings {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            context: None,
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeSettings {
    /// Invoked as `<binary> compose ...`.
    pub binary: String,
    pub project_dir: Option<PathBuf>,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            project_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub workspace_id: Option<String>,
    pub resource_id: Option<String>,
}

impl AppConfig {
    /// Fill Azure identifiers the file left empty from the environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.azure.workspace_id.is_none() {
            self.azure.workspace_id = non_empty(WORKSPACE_ID_ENV);
        }
        if self.azure.resource_id.is_none() {
            self.azure.resource_id = non_empty(RESOURCE_ID_ENV);
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = if let Some(path) = path {
        load_config_from_path(path)?
    } else {
        default_config().clone()
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

pub fn load_config_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static AppConfig {
    static DEFAULT_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::default);
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_only_fill_missing_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (WORKSPACE_ID_ENV, "ws-from-env"),
            (RESOURCE_ID_ENV, "/subscriptions/x"),
        ]);

        let mut config = AppConfig::default();
        config.azure.workspace_id = Some("ws-from-file".to_string());
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.azure.workspace_id.as_deref(), Some("ws-from-file"));
        assert_eq!(config.azure.resource_id.as_deref(), Some("/subscriptions/x"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert!(config.azure.workspace_id.is_none());
    }
}
