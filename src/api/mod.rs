//! HTTP API for the task tracker.
//!
//! ## Endpoints
//!
//! - `POST /task` - Create a task
//! - `GET /task` - List all tasks
//! - `GET /task/{id}` - Get one task
//! - `PUT /task/{id}` - Replace a task's mutable fields
//! - `PATCH /task/{id}` - Update only the fields present in the body
//! - `PATCH /task/{id}/complete` - Toggle completion
//! - `DELETE /task/{id}` - Delete a task
//! - `GET /task/tag/{tag}` - Tasks carrying a tag
//! - `GET /task/priority/{priority}` - Tasks with a priority (case-insensitive)
//! - `GET /task/completed` / `GET /task/pending` - Tasks by completion state
//! - `GET /task/search?q=` - Substring search on title or description
//! - `GET /task/stats` - Aggregate counters
//! - `GET /health` - Health check

pub mod error;
mod routes;
pub mod task_store;
mod tasks;
pub mod types;

pub use error::ApiError;
pub use routes::{build_router, serve, AppState};
pub use types::*;
