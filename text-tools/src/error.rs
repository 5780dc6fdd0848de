//! Error types for the text tools core.

use thiserror::Error;

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors that can occur in the tool registry.
///
/// Failures inside a tool's own code never show up here: the executor turns
/// them into diagnostic text.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool not found.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Attempt to edit or delete a built-in tool.
    #[error("tool is read-only: {0}")]
    ReadOnly(String),

    /// Tool record failed validation.
    #[error("invalid tool: {0}")]
    InvalidTool(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read a record.
    #[error("failed to read record: {0}")]
    ReadRecord(String),

    /// Failed to write a record.
    #[error("failed to write record: {0}")]
    WriteRecord(String),

    /// Failed to delete a record.
    #[error("failed to delete record: {0}")]
    DeleteRecord(String),

    /// Record key is not usable as a storage name.
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),
}
