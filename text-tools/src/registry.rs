//! Tool registry: the interface consumed by the presentation layer.
//!
//! The registry pairs a [`ToolStore`] with a [`ToolExecutor`]. Every
//! mutation hands back the fresh custom catalog so callers can re-render
//! from it instead of holding on to shared state.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::TextToolsConfig;
use crate::error::{Result, ToolError};
use crate::executor::{ExecutionResult, ToolExecutor};
use crate::storage::{FileStorage, MemoryStorage};
use crate::store::ToolStore;
use crate::tool::{Tool, ToolEdit};

/// Catalog access and tool execution.
pub struct ToolRegistry {
    store: ToolStore,
    executor: ToolExecutor,
}

impl ToolRegistry {
    /// Create a registry from its parts.
    pub fn new(store: ToolStore, executor: ToolExecutor) -> Self {
        Self { store, executor }
    }

    /// Open a registry backed by files under `config.data_dir`.
    ///
    /// If the data directory cannot be used the registry falls back to
    /// in-memory storage, so built-in tools stay available.
    pub async fn open(config: &TextToolsConfig) -> Self {
        let store = match FileStorage::new(&config.data_dir).await {
            Ok(storage) => {
                info!("Using tool storage at {}", config.data_dir.display());
                ToolStore::with_key(Arc::new(storage), config.storage_key.clone())
            }
            Err(e) => {
                warn!("Persistent storage unavailable, custom tools will not be saved: {e}");
                ToolStore::with_key(Arc::new(MemoryStorage::new()), config.storage_key.clone())
            }
        };

        Self::new(store, ToolExecutor::with_config(config.executor.clone()))
    }

    /// The underlying store.
    pub fn store(&self) -> &ToolStore {
        &self.store
    }

    /// Built-in tools followed by custom tools.
    pub async fn catalog(&self) -> Vec<Tool> {
        self.store.merged().await
    }

    /// Look up a tool by id.
    pub async fn get(&self, id: &str) -> Option<Tool> {
        self.store.get(id).await
    }

    /// Run a tool. Failures are embedded in the returned text.
    pub fn run_tool(&self, tool: &Tool, input: &str) -> String {
        self.execute(tool, input).into_output()
    }

    /// Run a tool and keep the execution details.
    pub fn execute(&self, tool: &Tool, input: &str) -> ExecutionResult {
        self.executor.execute(tool, input)
    }

    /// Run the tool with the given id.
    pub async fn run_by_id(&self, id: &str, input: &str) -> Result<String> {
        let tool = self
            .get(id)
            .await
            .ok_or_else(|| ToolError::NotFound(id.to_string()))?;
        Ok(self.run_tool(&tool, input))
    }

    /// Save a new or edited custom tool. Returns the custom catalog.
    pub async fn create_or_update_tool(&self, tool: Tool) -> Result<Vec<Tool>> {
        self.store.save_custom(tool).await
    }

    /// Apply an edit to an existing custom tool.
    pub async fn edit_tool(&self, id: &str, edit: ToolEdit) -> Result<Vec<Tool>> {
        let tool = self
            .get(id)
            .await
            .ok_or_else(|| ToolError::NotFound(id.to_string()))?;
        let edited = tool.edit(edit)?;
        edited.validate()?;
        self.store.save_custom(edited).await
    }

    /// Delete a custom tool. Built-in tools cannot be removed.
    pub async fn remove_tool(&self, id: &str) -> Result<Vec<Tool>> {
        if self.store.list_builtins().iter().any(|t| t.id == id) {
            return Err(ToolError::ReadOnly(id.to_string()));
        }
        self.store.delete_custom(id).await
    }

    /// Derive an unsaved, editable copy of `tool`.
    pub fn clone_tool(&self, tool: &Tool) -> Tool {
        tool.clone_as_draft()
    }

    /// Start an unsaved custom tool.
    pub fn new_tool(&self) -> Tool {
        Tool::new_custom()
    }
}
