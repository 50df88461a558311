//! API request and response types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::{Priority, Task};

/// Query string for `GET /task/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in title or description
    pub q: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Configured store backend (`memory`, `file`, `sqlite`)
    pub store: String,
    pub persistent: bool,
}

/// Aggregate statistics over all tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,

    /// Completed share in whole percent (0 when there are no tasks)
    pub completion_rate: u32,

    pub total_focus_minutes: i64,
    pub total_pomodoros: i64,

    /// Task count per stored priority; the four known priorities are always present
    pub by_priority: BTreeMap<String, usize>,
}

impl StatsResponse {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();

        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        let mut by_priority: BTreeMap<String, usize> = Priority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        for task in tasks {
            if let Some(priority) = &task.priority {
                *by_priority.entry(priority.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            total_focus_minutes: saturating_total(tasks.iter().map(|t| t.focus_time_minutes)),
            total_pomodoros: saturating_total(tasks.iter().map(|t| t.pomodoro_count)),
            by_priority,
        }
    }
}

/// Counters are stored as given, so totals clamp instead of overflowing.
fn saturating_total(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0i64, i64::saturating_add)
}
