//! Core tool type and its lifecycle.
//!
//! A tool is a named string-to-string transformation whose body is a snippet
//! of JavaScript. Built-in tools are fixed; custom tools are created, edited,
//! cloned and deleted by the user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ToolError};

/// Body given to freshly created tools: the identity transformation.
pub const DEFAULT_CODE: &str = "return input;";

/// Suffix appended to the name of a cloned tool.
pub const CLONE_SUFFIX: &str = " (Copy)";

/// A text transformation tool.
///
/// The serialized shape is exactly what gets persisted for custom tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique identifier. Empty only for unsaved clone drafts.
    pub id: String,

    /// Display label.
    pub name: String,

    /// What the tool does.
    #[serde(default)]
    pub description: String,

    /// Function body. Receives `input` and returns a string.
    pub code: String,

    /// Whether the tool was authored by the user.
    #[serde(default)]
    pub is_custom: bool,
}

impl Tool {
    /// Create a built-in tool with a fixed identifier.
    pub fn builtin(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            code: code.into(),
            is_custom: false,
        }
    }

    /// Start a new custom tool.
    ///
    /// The draft is runnable as-is: its body returns the input unchanged.
    pub fn new_custom() -> Self {
        Self {
            id: generate_id(),
            name: String::new(),
            description: String::new(),
            code: DEFAULT_CODE.to_string(),
            is_custom: true,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Whether the user may edit or delete this tool.
    pub fn is_editable(&self) -> bool {
        self.is_custom
    }

    /// Derive an editable draft from this tool.
    ///
    /// The id is cleared and gets assigned when the draft is saved.
    pub fn clone_as_draft(&self) -> Self {
        Self {
            id: String::new(),
            name: format!("{}{CLONE_SUFFIX}", self.name),
            description: self.description.clone(),
            code: self.code.clone(),
            is_custom: true,
        }
    }

    /// Apply an edit, keeping the identifier.
    pub fn edit(&self, edit: ToolEdit) -> Result<Self> {
        if !self.is_editable() {
            return Err(ToolError::ReadOnly(self.id.clone()));
        }

        Ok(Self {
            id: self.id.clone(),
            name: edit.name.unwrap_or_else(|| self.name.clone()),
            description: edit.description.unwrap_or_else(|| self.description.clone()),
            code: edit.code.unwrap_or_else(|| self.code.clone()),
            is_custom: true,
        })
    }

    /// Check that the tool can be saved.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ToolError::InvalidTool("name must not be empty".to_string()));
        }
        if self.code.is_empty() {
            return Err(ToolError::InvalidTool("code must not be empty".to_string()));
        }
        Ok(())
    }

    /// Assign a fresh identifier if the tool has none yet.
    pub(crate) fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
    }
}

/// Replacement values for an edit. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ToolEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
}

impl ToolEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Generate an identifier for a custom tool.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
