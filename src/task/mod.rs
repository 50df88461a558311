//! Task module - defines task records, their steps, and the update rules.
//!
//! - `task`: the stored `Task` record and the incoming `TaskPayload` shape
//! - `subitem`: embedded checklist steps
//! - `merge`: pure functions computing a new record state from old state + input

pub mod merge;
mod subitem;
pub mod task;

pub use merge::{apply_patch, apply_replace, next_timestamp, toggle_completed};
pub use subitem::SubItem;
pub use task::{Priority, Task, TaskPayload};
