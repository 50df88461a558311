//! Checklist steps embedded in a task.

use serde::{Deserialize, Serialize};

/// One step of a task's checklist.
///
/// Steps have no identity of their own: they are stored, replaced and
/// returned only as part of their parent task's `steps` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItem {
    #[serde(default)]
    pub step_name: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl SubItem {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            is_completed: false,
        }
    }

    /// Mark this step as done.
    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }
}
