//! Configuration for the text tools core.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::store::DEFAULT_STORAGE_KEY;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextToolsConfig {
    /// Directory holding the custom tool record.
    pub data_dir: PathBuf,

    /// Name of the record holding custom tools.
    pub storage_key: String,

    /// Execution engine settings.
    pub executor: ExecutorConfig,
}

impl TextToolsConfig {
    /// Create a configuration storing data under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            executor: ExecutorConfig::default(),
        }
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the executor configuration.
    pub fn with_executor(mut self, config: ExecutorConfig) -> Self {
        self.executor = config;
        self
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ToolError::Config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }
}

impl Default for TextToolsConfig {
    fn default() -> Self {
        Self::new(dirs::data_dir().unwrap_or_default().join("text-tools"))
    }
}

/// Runtime limits for tool code. Unset means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum iterations of any single loop.
    pub loop_iteration_limit: Option<u64>,

    /// Maximum call depth.
    pub recursion_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = TextToolsConfig::new("/tmp/text-tools");
        assert_eq!(config.storage_key, "custom_text_tools");
        assert_eq!(config.executor, ExecutorConfig::default());
        assert_eq!(config.executor.loop_iteration_limit, None);
    }

    #[test]
    fn test_partial_toml() {
        let config = TextToolsConfig::from_toml_str(
            r#"
data_dir = "/srv/tools"

[executor]
loop_iteration_limit = 100000
"#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/tools"));
        assert_eq!(config.storage_key, "custom_text_tools");
        assert_eq!(config.executor.loop_iteration_limit, Some(100_000));
        assert_eq!(config.executor.recursion_limit, None);
    }

    #[test]
    fn test_invalid_toml() {
        let err = TextToolsConfig::from_toml_str("data_dir = [").unwrap_err();
        assert!(matches!(err, ToolError::Config(_)));
    }
}
