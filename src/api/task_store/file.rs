//! JSON file-based task store.

use super::{
    new_task_id, sanitize_filename, sort_by_creation, StoreError, TaskStore, TaskStoreType,
};
use crate::task::Task;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Serialize, Deserialize, Default)]
struct TaskStoreSnapshot {
    tasks: HashMap<String, Task>,
}

#[derive(Clone)]
pub struct FileTaskStore {
    path: PathBuf,
    tasks: Arc<RwLock<HashMap<String, Task>>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileTaskStore {
    pub async fn new(base_dir: PathBuf, name: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir).await?;
        let filename = format!("{}.json", sanitize_filename(name));
        let path = base_dir.join(filename);
        let snapshot = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<TaskStoreSnapshot>(&bytes) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    // Keep the unreadable file out of the way of the next write.
                    let corrupt_path = path.with_extension("json.corrupt");
                    tracing::warn!(
                        "Failed to parse task store {}: {}; moving it to {}",
                        path.display(),
                        e,
                        corrupt_path.display()
                    );
                    fs::rename(&path, &corrupt_path).await?;
                    TaskStoreSnapshot::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => TaskStoreSnapshot::default(),
            Err(err) => {
                tracing::warn!("Failed to read task store {}: {}", path.display(), err);
                TaskStoreSnapshot::default()
            }
        };
        tracing::debug!(
            "Loaded {} tasks from {}",
            snapshot.tasks.len(),
            path.display()
        );

        Ok(Self {
            path,
            tasks: Arc::new(RwLock::new(snapshot.tasks)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Write `next` to disk, then make it the visible state.
    ///
    /// Callers must hold `persist_lock` from the moment they copy the current
    /// map until this returns. On error the visible state is left untouched.
    async fn commit(&self, next: HashMap<String, Task>) -> Result<(), StoreError> {
        let snapshot = TaskStoreSnapshot { tasks: next };
        let data = serde_json::to_vec_pretty(&snapshot)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).await?;
        fs::rename(&tmp_path, &self.path).await?;
        *self.tasks.write().await = snapshot.tasks;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    fn store_type(&self) -> TaskStoreType {
        TaskStoreType::File
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        sort_by_creation(&mut tasks);
        Ok(tasks)
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn task_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tasks.read().await.contains_key(id))
    }

    async fn insert_task(&self, mut task: Task) -> Result<Task, StoreError> {
        task.id = new_task_id();
        let _guard = self.persist_lock.lock().await;
        let mut next = self.tasks.read().await.clone();
        next.insert(task.id.clone(), task.clone());
        self.commit(next).await?;
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut next = self.tasks.read().await.clone();
        next.insert(task.id.clone(), task.clone());
        self.commit(next).await
    }

    async fn delete_task(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut next = self.tasks.read().await.clone();
        if next.remove(id).is_none() {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }
}
