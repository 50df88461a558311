//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: JSON snapshot file
//! - `sqlite`: SQLite database (default)

mod file;
mod memory;
mod sqlite;

pub use file::FileTaskStore;
pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::task::Task;

/// Failure inside a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Attribute filters supported by every store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// `tags` contains the value (exact, any position)
    Tag(String),
    /// `priority` equals the value (callers normalize case first)
    Priority(String),
    /// `completed` equals the value
    Completed(bool),
    /// Case-insensitive substring of `title` OR `description`
    Search(String),
}

impl TaskFilter {
    /// Evaluate the filter against a single task.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::Tag(tag) => task.has_tag(tag),
            TaskFilter::Priority(priority) => task.priority.as_deref() == Some(priority.as_str()),
            TaskFilter::Completed(completed) => task.completed == *completed,
            TaskFilter::Search(query) => task.mentions(query),
        }
    }
}

/// Generate a fresh task identifier.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sort tasks into insertion order (creation time, then id).
pub fn sort_by_creation(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sanitize a string for use as a filename.
pub fn sanitize_filename(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        "default".to_string()
    } else {
        out
    }
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Which backend this is.
    fn store_type(&self) -> TaskStoreType;

    /// List all tasks in insertion order.
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// List tasks matching `filter`, in insertion order.
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    /// Get a single task by ID.
    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Whether a task with this ID exists.
    async fn task_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_task(id).await?.is_some())
    }

    /// Store a new task under a freshly generated ID (any `id` on the input is
    /// discarded) and return the stored record.
    async fn insert_task(&self, task: Task) -> Result<Task, StoreError>;

    /// Insert or replace the task stored under `task.id`.
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Delete a task. Returns whether it existed.
    async fn delete_task(&self, id: &str) -> Result<bool, StoreError>;
}

/// Shared handle to the configured store.
pub type SharedTaskStore = Arc<dyn TaskStore>;

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "file" | "json" => Self::File,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a task store from configuration.
pub async fn create_task_store(config: &StoreConfig) -> Result<SharedTaskStore, StoreError> {
    let base_dir: PathBuf = config.dir.clone();
    match config.store_type {
        TaskStoreType::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        TaskStoreType::File => {
            let store = FileTaskStore::new(base_dir, &config.name).await?;
            Ok(Arc::new(store))
        }
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(base_dir, &config.name).await?;
            Ok(Arc::new(store))
        }
    }
}
