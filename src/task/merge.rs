//! Update rules for stored tasks.
//!
//! Pure functions: each takes the current record and returns the next one.
//! Persisting the result (and reporting a missing record) is the caller's job.
//!
//! # Invariants (all functions)
//! - `id` and `created_at` are carried over unchanged
//! - `updated_at` of the result is strictly later than the input's

use chrono::{DateTime, Duration, Utc};

use super::{Task, TaskPayload};

/// Timestamp to stamp on a record whose previous stamp is `previous`.
///
/// # Postcondition
/// Returns `now` when it is later than `previous`, otherwise `previous`
/// advanced by one microsecond. Clock skew or coarse clocks therefore never
/// produce a non-increasing `updated_at`.
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Partial update: every field present in `patch` replaces the stored value
/// wholesale; absent fields are left as they are.
///
/// `tags` and `steps` are replaced as whole lists, never merged element-wise.
/// `completed`, `focus_time_minutes` and `pomodoro_count` follow the same
/// presence rule, so an explicit `false` / `0` overwrites while omission
/// does not.
pub fn apply_patch(mut current: Task, patch: TaskPayload, now: DateTime<Utc>) -> Task {
    if let Some(title) = patch.title {
        current.title = Some(title);
    }
    if let Some(description) = patch.description {
        current.description = Some(description);
    }
    if let Some(tags) = patch.tags {
        current.tags = tags;
    }
    if let Some(steps) = patch.steps {
        current.steps = steps;
    }
    if let Some(completed) = patch.completed {
        current.completed = completed;
    }
    if let Some(priority) = patch.priority {
        current.priority = Some(priority);
    }
    if let Some(due_date) = patch.due_date {
        current.due_date = Some(due_date);
    }
    if let Some(minutes) = patch.focus_time_minutes {
        current.focus_time_minutes = minutes;
    }
    if let Some(count) = patch.pomodoro_count {
        current.pomodoro_count = count;
    }
    current.updated_at = next_timestamp(current.updated_at, now);
    current
}

/// Full update: every mutable field is taken from `incoming`, present or not.
///
/// Absent optionals become `None`, absent lists become empty, absent
/// `completed` becomes `false` and absent counters become `0`.
pub fn apply_replace(mut current: Task, incoming: TaskPayload, now: DateTime<Utc>) -> Task {
    current.title = incoming.title;
    current.tags = incoming.tags.unwrap_or_default();
    current.description = incoming.description;
    current.steps = incoming.steps.unwrap_or_default();
    current.completed = incoming.completed.unwrap_or(false);
    current.priority = incoming.priority;
    current.due_date = incoming.due_date;
    current.focus_time_minutes = incoming.focus_time_minutes.unwrap_or(0);
    current.pomodoro_count = incoming.pomodoro_count.unwrap_or(0);
    current.updated_at = next_timestamp(current.updated_at, now);
    current
}

/// Flip `completed`.
pub fn toggle_completed(mut current: Task, now: DateTime<Utc>) -> Task {
    current.completed = !current.completed;
    current.updated_at = next_timestamp(current.updated_at, now);
    current
}
