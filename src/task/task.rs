//! Core Task record and the incoming payload shape.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards
//! - `created_at` is set once, at creation
//! - `updated_at >= created_at`, and every mutation moves it strictly forward
//!
//! `priority` and the counters are advisory: values outside the known set
//! (or negative counters) are stored as given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SubItem;

/// Known task priorities.
///
/// Tasks store priority as text, so this enum is only used for defaults and
/// for reporting the known buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All known priorities, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Wire representation (`"LOW"`, `"MEDIUM"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// Normalize a caller-supplied priority for matching. Only case is folded;
    /// surrounding whitespace is significant.
    pub fn normalize(value: &str) -> String {
        value.to_uppercase()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Checklist steps in display order
    #[serde(default)]
    pub steps: Vec<SubItem>,
    #[serde(default)]
    pub completed: bool,
    pub priority: Option<String>,
    /// Due date exactly as supplied by the caller (ISO-8601 expected, not enforced)
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Total focus time spent on this task
    #[serde(default)]
    pub focus_time_minutes: i64,
    /// Number of pomodoro sessions completed
    #[serde(default)]
    pub pomodoro_count: i64,
}

impl Task {
    /// Build a new, not yet stored task from a create request.
    ///
    /// # Postcondition
    /// `id` is empty (the store assigns it), `created_at == updated_at == now`,
    /// and `priority` is `MEDIUM` when the payload has none.
    pub fn from_payload(payload: TaskPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title: payload.title,
            description: payload.description,
            tags: payload.tags.unwrap_or_default(),
            steps: payload.steps.unwrap_or_default(),
            completed: payload.completed.unwrap_or(false),
            priority: Some(
                payload
                    .priority
                    .unwrap_or_else(|| Priority::default().as_str().to_string()),
            ),
            due_date: payload.due_date,
            created_at: now,
            updated_at: now,
            focus_time_minutes: payload.focus_time_minutes.unwrap_or(0),
            pomodoro_count: payload.pomodoro_count.unwrap_or(0),
        }
    }

    /// Whether `tag` is one of this task's tags (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match on title or description.
    pub fn mentions(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        contains(&self.title) || contains(&self.description)
    }
}

/// Incoming task representation for create, full update and partial update.
///
/// Every field is optional so that presence can be observed. Fields that are
/// not part of the mutable set (`id`, `createdAt`, `updatedAt`) are ignored
/// when present in a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub steps: Option<Vec<SubItem>>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub focus_time_minutes: Option<i64>,
    pub pomodoro_count: Option<i64>,
}
