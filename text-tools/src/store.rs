//! The tool store.
//!
//! `ToolStore` merges the built-in catalog with the user's custom tools and
//! owns persistence of the custom subset. The custom catalog is kept as one
//! JSON array under a single storage record and is rewritten in full on
//! every mutation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::builtin::{builtin_tools, is_builtin_id};
use crate::error::Result;
use crate::storage::KeyValueStorage;
use crate::tool::Tool;

/// Record key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "custom_text_tools";

/// Catalog of built-in and custom tools.
pub struct ToolStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl ToolStore {
    /// Create a store over `storage` using the default record key.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a store that keeps custom tools under `key`.
    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The built-in tools.
    pub fn list_builtins(&self) -> Vec<Tool> {
        builtin_tools()
    }

    /// Read the custom tools.
    ///
    /// Never fails: a missing record is an empty catalog, and an unreadable
    /// or malformed record is logged and also treated as empty.
    pub async fn load_custom(&self) -> Vec<Tool> {
        let content = match self.storage.get_item(&self.key).await {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read custom tools: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Tool>>(&content) {
            Ok(mut tools) => {
                // Everything in this record is user-owned, flag or not.
                for tool in &mut tools {
                    tool.is_custom = true;
                }
                debug!("Loaded {} custom tools", tools.len());
                tools
            }
            Err(e) => {
                warn!("Custom tool record {} is corrupt, ignoring it: {e}", self.key);
                Vec::new()
            }
        }
    }

    /// Insert or replace a custom tool, then persist the whole catalog.
    ///
    /// Replacement keeps the existing position. Tools with an empty name or
    /// empty code, and tools claiming a built-in id, are refused and the
    /// catalog is returned unchanged.
    pub async fn save_custom(&self, mut tool: Tool) -> Result<Vec<Tool>> {
        let mut tools = self.load_custom().await;

        if let Err(e) = tool.validate() {
            warn!("Refusing to save tool {:?}: {e}", tool.name);
            return Ok(tools);
        }
        if is_builtin_id(&tool.id) {
            warn!("Refusing to save tool over built-in id {}", tool.id);
            return Ok(tools);
        }

        tool.ensure_id();
        tool.is_custom = true;

        match tools.iter().position(|t| t.id == tool.id) {
            Some(index) => {
                debug!("Replacing custom tool {}", tool.id);
                tools[index] = tool;
            }
            None => {
                info!("Adding custom tool {} ({})", tool.name, tool.id);
                tools.push(tool);
            }
        }

        self.persist(&tools).await?;
        Ok(tools)
    }

    /// Remove a custom tool by id, then persist the remainder.
    ///
    /// Unknown ids leave the catalog as it is.
    pub async fn delete_custom(&self, id: &str) -> Result<Vec<Tool>> {
        let mut tools = self.load_custom().await;
        let before = tools.len();
        tools.retain(|t| t.id != id);

        if tools.len() == before {
            debug!("No custom tool with id {id}");
            return Ok(tools);
        }

        self.persist(&tools).await?;
        info!("Deleted custom tool {id}");
        Ok(tools)
    }

    /// Built-in tools followed by custom tools.
    pub async fn merged(&self) -> Vec<Tool> {
        let mut tools = self.list_builtins();
        tools.extend(self.load_custom().await);
        tools
    }

    /// Look up a tool in the merged catalog.
    pub async fn get(&self, id: &str) -> Option<Tool> {
        self.merged().await.into_iter().find(|t| t.id == id)
    }

    /// Drop the custom catalog record entirely.
    pub async fn reset_custom(&self) -> Result<()> {
        self.storage.remove_item(&self.key).await?;
        info!("Reset custom tool record {}", self.key);
        Ok(())
    }

    async fn persist(&self, tools: &[Tool]) -> Result<()> {
        let content = serde_json::to_string(tools)?;
        self.storage.set_item(&self.key, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn memory_store() -> ToolStore {
        ToolStore::new(Arc::new(MemoryStorage::new()))
    }

    fn custom(name: &str) -> Tool {
        Tool::new_custom().with_name(name)
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = memory_store();
        assert!(store.load_custom().await.is_empty());
        assert_eq!(store.merged().await, builtin_tools());
    }

    #[tokio::test]
    async fn test_save_appends_and_replaces_in_place() {
        let store = memory_store();
        let first = custom("First");
        let second = custom("Second");
        store.save_custom(first.clone()).await.unwrap();
        store.save_custom(second.clone()).await.unwrap();

        let renamed = first.clone().with_name("First, renamed");
        let tools = store.save_custom(renamed).await.unwrap();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].id, first.id);
        assert_eq!(tools[0].name, "First, renamed");
        assert_eq!(tools[1].id, second.id);
        assert_eq!(store.load_custom().await, tools);
    }

    #[tokio::test]
    async fn test_save_assigns_id_to_drafts() {
        let store = memory_store();
        let builtin = store.get("length-text").await.unwrap();

        let tools = store.save_custom(builtin.clone_as_draft()).await.unwrap();

        assert_eq!(tools.len(), 1);
        assert!(!tools[0].id.is_empty());
        assert_ne!(tools[0].id, builtin.id);
        assert_eq!(tools[0].name, "Length Text (Copy)");
        assert!(tools[0].is_custom);
    }

    #[tokio::test]
    async fn test_save_refuses_invalid_tools() {
        let store = memory_store();
        store.save_custom(custom("Kept")).await.unwrap();

        let unnamed = store.save_custom(Tool::new_custom()).await.unwrap();
        assert_eq!(unnamed.len(), 1);

        let empty_code = store
            .save_custom(custom("No code").with_code(""))
            .await
            .unwrap();
        assert_eq!(empty_code.len(), 1);

        let mut shadow = custom("Shadow");
        shadow.id = "join-text".to_string();
        let shadowed = store.save_custom(shadow).await.unwrap();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].name, "Kept");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = memory_store();
        let keep = custom("Keep");
        let removed = custom("Drop");
        store.save_custom(keep.clone()).await.unwrap();
        store.save_custom(removed.clone()).await.unwrap();

        let unchanged = store.delete_custom("no-such-id").await.unwrap();
        assert_eq!(unchanged.len(), 2);

        let tools = store.delete_custom(&removed.id).await.unwrap();
        assert_eq!(tools, vec![keep]);

        let builtins = store.delete_custom("join-text").await.unwrap();
        assert_eq!(builtins.len(), 1);
        assert!(store.get("join-text").await.is_some());
    }

    #[tokio::test]
    async fn test_merged_lists_builtins_first() {
        let store = memory_store();
        store.save_custom(custom("Zeta")).await.unwrap();
        store.save_custom(custom("Alpha")).await.unwrap();

        let merged = store.merged().await;
        let builtin_count = store.list_builtins().len();

        assert_eq!(merged.len(), builtin_count + 2);
        assert!(merged[..builtin_count].iter().all(|t| !t.is_custom));
        assert_eq!(merged[builtin_count].name, "Zeta");
        assert_eq!(merged[builtin_count + 1].name, "Alpha");
    }

    #[tokio::test]
    async fn test_corrupt_record_falls_back_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(DEFAULT_STORAGE_KEY, "{not json")
            .await
            .unwrap();
        let store = ToolStore::new(storage.clone());

        assert!(store.load_custom().await.is_empty());
        assert_eq!(store.merged().await.len(), store.list_builtins().len());

        store.reset_custom().await.unwrap();
        assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_loaded_tools_are_custom() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"legacy","name":"Legacy","code":"return input;"}]"#,
            )
            .await
            .unwrap();
        let store = ToolStore::new(storage);

        let tools = store.load_custom().await;
        assert_eq!(tools.len(), 1);
        assert!(tools[0].is_custom);
        assert!(store.get("legacy").await.unwrap().is_editable());
    }

    #[tokio::test]
    async fn test_tool_persistence() {
        let temp_dir = TempDir::new().unwrap();

        let tool = custom("Persisted");
        {
            let storage = FileStorage::new(temp_dir.path()).await.unwrap();
            let store = ToolStore::new(Arc::new(storage));
            store.save_custom(tool.clone()).await.unwrap();
        }

        // Reload and verify
        {
            let storage = FileStorage::new(temp_dir.path()).await.unwrap();
            let store = ToolStore::new(Arc::new(storage));
            assert_eq!(store.get(&tool.id).await, Some(tool));
        }
    }
}
