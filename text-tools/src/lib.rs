//! # Text Tools
//!
//! Core of a text-transformation utility. A *tool* is a named snippet of
//! JavaScript that turns an input string into an output string. This crate
//! provides:
//!
//! - **Built-in tools**: a fixed catalog shipped with the application
//! - **Custom tools**: user-authored tools persisted on the local device
//! - **Execution**: compiling tool code and running it, with every failure
//!   reported as diagnostic text instead of an error
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          ToolRegistry                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ToolStore ──► builtin catalog ++ custom catalog                │
//! │      │                                                          │
//! │      ▼                                                          │
//! │  KeyValueStorage (FileStorage | MemoryStorage)                  │
//! │                                                                 │
//! │  ToolExecutor ──► fresh JavaScript context per run              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use text_tools::{TextToolsConfig, ToolRegistry};
//!
//! let registry = ToolRegistry::open(&TextToolsConfig::default()).await;
//! let output = registry.run_by_id("join-text", "a\nb\n").await?;
//! assert_eq!(output, "a,b");
//! ```

pub mod builtin;
pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod storage;
pub mod store;
pub mod tool;

pub use builtin::builtin_tools;
pub use config::{ExecutorConfig, TextToolsConfig};
pub use error::{Result, StorageError, ToolError};
pub use executor::{ExecutionResult, ToolExecutor};
pub use registry::ToolRegistry;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::ToolStore;
pub use tool::{Tool, ToolEdit};
