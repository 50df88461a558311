//! # task-tracker
//!
//! Task tracking record manager with a small HTTP API.
//!
//! Clients create, read, update and delete task records, each with optional
//! checklist steps, tags, a priority, a due date and focus-time counters.
//!
//! ## Request Flow
//! 1. Handler looks the task up in the configured store
//! 2. Update rules in `task::merge` compute the next record state
//! 3. The store persists it and the handler maps the outcome to a status code
//!
//! ## Modules
//! - `api`: HTTP handlers, router, and the pluggable task stores
//! - `task`: Task records and update rules
//! - `config`: Environment-driven configuration

pub mod api;
pub mod config;
pub mod task;

pub use config::Config;
pub use task::{SubItem, Task, TaskPayload};
