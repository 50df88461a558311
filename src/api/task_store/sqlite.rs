//! SQLite-based task store.

use super::{new_task_id, sanitize_filename, StoreError, TaskFilter, TaskStore, TaskStoreType};
use crate::task::Task;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT,
    description TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    steps TEXT NOT NULL DEFAULT '[]',
    completed INTEGER NOT NULL DEFAULT 0,
    priority TEXT,
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    focus_time_minutes INTEGER NOT NULL DEFAULT 0,
    pomodoro_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed);
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, description, tags, steps, completed, priority,
        due_date, created_at, updated_at, focus_time_minutes, pomodoro_count
 FROM tasks";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(base_dir: PathBuf, name: &str) -> Result<Self, StoreError> {
        let db_path = base_dir.join(format!("{}.db", sanitize_filename(name)));

        tokio::fs::create_dir_all(&base_dir).await?;

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            tracing::debug!("Opened task database {}", db_path.display());
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a SELECT with an optional WHERE clause, returning tasks in insertion order.
    async fn query_tasks(
        &self,
        where_clause: Option<&'static str>,
        param: Option<Value>,
    ) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let sql = match where_clause {
                Some(clause) => {
                    format!("{} WHERE {} ORDER BY created_at, id", SELECT_COLUMNS, clause)
                }
                None => format!("{} ORDER BY created_at, id", SELECT_COLUMNS),
            };
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_from_iter(param.iter()), row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await?
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json<T: serde::de::DeserializeOwned>(idx: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let tags_json: String = row.get(3)?;
    let steps_json: String = row.get(4)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        tags: parse_json(3, &tags_json)?,
        steps: parse_json(4, &steps_json)?,
        completed: row.get::<_, i64>(5)? != 0,
        priority: row.get(6)?,
        due_date: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: parse_timestamp(9, &updated_at)?,
        focus_time_minutes: row.get(10)?,
        pomodoro_count: row.get(11)?,
    })
}

fn upsert(conn: &Connection, task: &Task) -> Result<(), StoreError> {
    let tags_json = serde_json::to_string(&task.tags)?;
    let steps_json = serde_json::to_string(&task.steps)?;
    conn.execute(
        "INSERT OR REPLACE INTO tasks (id, title, description, tags, steps, completed, priority,
                                       due_date, created_at, updated_at, focus_time_minutes,
                                       pomodoro_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            task.id,
            task.title,
            task.description,
            tags_json,
            steps_json,
            task.completed,
            task.priority,
            task.due_date,
            format_timestamp(&task.created_at),
            format_timestamp(&task.updated_at),
            task.focus_time_minutes,
            task.pomodoro_count,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    fn store_type(&self) -> TaskStoreType {
        TaskStoreType::Sqlite
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.query_tasks(None, None).await
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        match filter {
            TaskFilter::Tag(tag) => {
                self.query_tasks(
                    Some("EXISTS (SELECT 1 FROM json_each(tasks.tags) WHERE json_each.value = ?1)"),
                    Some(Value::Text(tag.clone())),
                )
                .await
            }
            TaskFilter::Priority(priority) => {
                self.query_tasks(Some("priority = ?1"), Some(Value::Text(priority.clone())))
                    .await
            }
            TaskFilter::Completed(completed) => {
                self.query_tasks(Some("completed = ?1"), Some(Value::Integer(i64::from(*completed))))
                    .await
            }
            // SQLite's lower() only folds ASCII; match in Rust for full Unicode case folding.
            TaskFilter::Search(_) => {
                let tasks = self.list_tasks().await?;
                Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
            }
        }
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
            let task = stmt.query_row(params![id], row_to_task).optional()?;
            Ok(task)
        })
        .await?
    }

    async fn task_exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let exists = conn
                .prepare("SELECT 1 FROM tasks WHERE id = ?1")?
                .exists(params![id])?;
            Ok(exists)
        })
        .await?
    }

    async fn insert_task(&self, mut task: Task) -> Result<Task, StoreError> {
        task.id = new_task_id();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            upsert(&conn, &task)?;
            Ok(task)
        })
        .await?
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.clone();
        let task = task.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            upsert(&conn, &task)
        })
        .await?
    }

    async fn delete_task(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })
        .await?
    }
}
