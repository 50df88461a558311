//! Task API endpoints.
//!
//! Provides endpoints for managing task records:
//! - Create, list, fetch, replace, patch and delete tasks
//! - Toggle completion
//! - Filter by tag, priority, completion state, or free text
//! - Aggregate stats

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::task::{self, Priority, Task, TaskPayload};

use super::error::ApiError;
use super::routes::AppState;
use super::task_store::TaskFilter;
use super::types::{SearchQuery, StatsResponse};

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/completed", get(list_completed))
        .route("/pending", get(list_pending))
        .route("/search", get(search_tasks))
        .route("/stats", get(get_stats))
        .route("/tag/:tag", get(list_by_tag))
        .route("/priority/:priority", get(list_by_priority))
        .route(
            "/:id",
            get(get_task)
                .put(replace_task)
                .patch(patch_task)
                .delete(delete_task),
        )
        .route("/:id/complete", patch(toggle_complete))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /task - Create a new task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let draft = Task::from_payload(payload, Utc::now());
    let task = state.tasks.insert_task(draft).await?;
    tracing::debug!("Created task {}", task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /task - List all tasks.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.list_tasks().await?))
}

/// GET /task/:id - Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = load(&state, &id).await?;
    Ok(Json(task))
}

/// PUT /task/:id - Replace every mutable field.
async fn replace_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let current = load(&state, &id).await?;
    let updated = task::apply_replace(current, payload, Utc::now());
    state.tasks.save_task(&updated).await?;
    tracing::debug!("Replaced task {}", id);
    Ok(Json(updated))
}

/// PATCH /task/:id - Update only the fields present in the body.
async fn patch_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let current = load(&state, &id).await?;
    let updated = task::apply_patch(current, payload, Utc::now());
    state.tasks.save_task(&updated).await?;
    tracing::debug!("Patched task {}", id);
    Ok(Json(updated))
}

/// PATCH /task/:id/complete - Flip the completed flag. Any body is ignored.
async fn toggle_complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let current = load(&state, &id).await?;
    let updated = task::toggle_completed(current, Utc::now());
    state.tasks.save_task(&updated).await?;
    tracing::debug!("Task {} completed={}", id, updated.completed);
    Ok(Json(updated))
}

/// DELETE /task/:id - Delete a task.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.tasks.task_exists(&id).await? {
        return Err(ApiError::not_found(id));
    }
    state.tasks.delete_task(&id).await?;
    tracing::debug!("Deleted task {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /task/tag/:tag - Tasks carrying this tag.
async fn list_by_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    find(&state, TaskFilter::Tag(tag)).await
}

/// GET /task/priority/:priority - Tasks with this priority (case-insensitive).
async fn list_by_priority(
    State(state): State<Arc<AppState>>,
    Path(priority): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    find(&state, TaskFilter::Priority(Priority::normalize(&priority))).await
}

/// GET /task/completed
async fn list_completed(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    find(&state, TaskFilter::Completed(true)).await
}

/// GET /task/pending
async fn list_pending(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    find(&state, TaskFilter::Completed(false)).await
}

/// GET /task/search?q= - Case-insensitive substring search on title or description.
async fn search_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    find(&state, TaskFilter::Search(query.q)).await
}

/// GET /task/stats - Aggregate counters over all tasks.
async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let tasks = state.tasks.list_tasks().await?;
    Ok(Json(StatsResponse::from_tasks(&tasks)))
}

async fn load(state: &AppState, id: &str) -> Result<Task, ApiError> {
    state
        .tasks
        .get_task(id)
        .await?
        .ok_or_else(|| ApiError::not_found(id))
}

async fn find(state: &AppState, filter: TaskFilter) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.find_tasks(&filter).await?))
}

#[cfg(test)]
mod tests {
    use super::super::routes::{build_router, AppState};
    use super::super::task_store::InMemoryTaskStore;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = Arc::new(AppState {
            config: Config::in_memory(),
            tasks: Arc::new(InMemoryTaskStore::new()),
        });
        build_router(state)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, task) = send(app, "POST", "/task", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        task
    }

    fn id_of(task: &Value) -> String {
        task["id"].as_str().unwrap().to_string()
    }

    fn ids(list: &Value) -> Vec<String> {
        list.as_array().unwrap().iter().map(id_of).collect()
    }

    #[tokio::test]
    async fn test_create_then_patch_completed() {
        let app = test_app();
        let task = create(&app, json!({"title": "Write spec", "tags": ["docs"]})).await;

        assert!(!task["id"].as_str().unwrap().is_empty());
        assert_eq!(task["priority"], "MEDIUM");
        assert_eq!(task["completed"], false);
        assert_eq!(task["tags"], json!(["docs"]));

        let id = task["id"].as_str().unwrap();
        let (status, patched) = send(
            &app,
            "PATCH",
            &format!("/task/{}", id),
            Some(json!({"completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["completed"], true);
        assert_eq!(patched["title"], "Write spec");
        assert_eq!(patched["createdAt"], task["createdAt"]);
        assert_ne!(patched["updatedAt"], task["updatedAt"]);

        let (status, fetched) = send(&app, "GET", &format!("/task/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, patched);
    }

    #[tokio::test]
    async fn test_put_replaces_all_mutable_fields() {
        let app = test_app();
        let task = create(
            &app,
            json!({
                "title": "Old",
                "description": "keep?",
                "tags": ["a"],
                "steps": [{"stepName": "one", "isCompleted": true}],
                "priority": "HIGH",
                "focusTimeMinutes": 30,
                "pomodoroCount": 1
            }),
        )
        .await;
        let id = task["id"].as_str().unwrap();
        let (_, toggled) = send(&app, "PATCH", &format!("/task/{}/complete", id), None).await;
        assert_eq!(toggled["completed"], true);

        let (status, replaced) = send(
            &app,
            "PUT",
            &format!("/task/{}", id),
            Some(json!({"title": "New", "dueDate": "2026-12-01T10:00:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replaced["id"], task["id"]);
        assert_eq!(replaced["title"], "New");
        assert_eq!(replaced["description"], Value::Null);
        assert_eq!(replaced["tags"], json!([]));
        assert_eq!(replaced["steps"], json!([]));
        assert_eq!(replaced["completed"], false);
        assert_eq!(replaced["priority"], Value::Null);
        assert_eq!(replaced["dueDate"], "2026-12-01T10:00:00");
        assert_eq!(replaced["focusTimeMinutes"], 0);
        assert_eq!(replaced["pomodoroCount"], 0);
    }

    #[tokio::test]
    async fn test_toggle_complete_twice() {
        let app = test_app();
        let task = create(&app, json!({"title": "Flip me"})).await;
        let uri = format!("/task/{}/complete", task["id"].as_str().unwrap());

        let (status, once) = send(&app, "PATCH", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(once["completed"], true);

        let (_, twice) = send(&app, "PATCH", &uri, Some(json!({"completed": true}))).await;
        assert_eq!(twice["completed"], false);
        assert_eq!(twice["title"], "Flip me");
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let app = test_app();
        let body = Some(json!({"title": "x"}));

        for (method, uri, body) in [
            ("GET", "/task/nope", None),
            ("PUT", "/task/nope", body.clone()),
            ("PATCH", "/task/nope", body),
            ("PATCH", "/task/nope/complete", None),
            ("DELETE", "/task/nope", None),
        ] {
            let (status, json) = send(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
            assert_eq!(json, Value::Null);
        }
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let app = test_app();
        let task = create(&app, json!({"title": "Temporary"})).await;
        let uri = format!("/task/{}", task["id"].as_str().unwrap());

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_filters() {
        let app = test_app();
        let docs = create(&app, json!({"title": "Write docs", "tags": ["docs"]})).await;
        let budget = create(
            &app,
            json!({
                "title": "Budget",
                "description": "Ask the Finance team",
                "tags": ["q3", "docs"],
                "priority": "URGENT"
            }),
        )
        .await;
        let offsite = create(&app, json!({"title": "Offsite", "priority": "low"})).await;
        send(
            &app,
            "PATCH",
            &format!("/task/{}/complete", offsite["id"].as_str().unwrap()),
            None,
        )
        .await;

        let (status, all) = send(&app, "GET", "/task", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, tagged) = send(&app, "GET", "/task/tag/docs", None).await;
        assert_eq!(ids(&tagged), vec![id_of(&docs), id_of(&budget)]);

        let (_, urgent) = send(&app, "GET", "/task/priority/urgent", None).await;
        assert_eq!(ids(&urgent), vec![id_of(&budget)]);

        let (_, padded) = send(&app, "GET", "/task/priority/%20urgent", None).await;
        assert!(padded.as_array().unwrap().is_empty());

        // Stored as given ("low"), lookups upper-case the path value.
        let (_, low) = send(&app, "GET", "/task/priority/LOW", None).await;
        assert!(low.as_array().unwrap().is_empty());

        let (_, completed) = send(&app, "GET", "/task/completed", None).await;
        assert_eq!(ids(&completed), vec![id_of(&offsite)]);

        let (_, pending) = send(&app, "GET", "/task/pending", None).await;
        assert_eq!(pending.as_array().unwrap().len(), 2);

        let (_, found) = send(&app, "GET", "/task/search?q=finance", None).await;
        assert_eq!(ids(&found), vec![id_of(&budget)]);

        let (_, found) = send(&app, "GET", "/task/search?q=WRITE", None).await;
        assert_eq!(ids(&found), vec![id_of(&docs)]);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let app = test_app();
        let (status, _) = send(&app, "GET", "/task/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = test_app();
        create(&app, json!({"title": "a", "focusTimeMinutes": 25, "pomodoroCount": 1})).await;
        let done = create(&app, json!({"title": "b", "priority": "HIGH"})).await;
        send(
            &app,
            "PATCH",
            &format!("/task/{}", done["id"].as_str().unwrap()),
            Some(json!({"completed": true})),
        )
        .await;

        let (status, stats) = send(&app, "GET", "/task/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["completed"], 1);
        assert_eq!(stats["pending"], 1);
        assert_eq!(stats["completionRate"], 50);
        assert_eq!(stats["totalFocusMinutes"], 25);
        assert_eq!(stats["totalPomodoros"], 1);
        assert_eq!(stats["byPriority"]["MEDIUM"], 1);
        assert_eq!(stats["byPriority"]["HIGH"], 1);
    }
}
