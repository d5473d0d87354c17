/// Task endpoints
///
/// Every handler receives the caller as a [`CurrentUser`] resolved by the
/// authentication layer and passes its id to the task service as the owner.
/// A task id that exists but belongs to someone else answers exactly like an
/// unknown id: `404 Task not found`.
///
/// # Endpoints
///
/// - `POST   /tasks` - Create a task (summary and embedding computed first)
/// - `GET    /tasks?status=` - List the caller's tasks, newest first
/// - `GET    /tasks/:id` - Fetch one task
/// - `PUT    /tasks/:id` - Update title and/or description
/// - `DELETE /tasks/:id` - Delete, returning the task as it was
/// - `PUT    /tasks/:id/complete` - Mark completed
/// - `PUT    /tasks/:id/pending` - Mark pending again

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use taskmind_shared::{
    auth::middleware::CurrentUser,
    models::task::{Task, TaskStatus},
    tasks::{NewTask, TaskChanges},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreate {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// May be empty; the summary is then "No description"
    #[serde(default)]
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: String,

    /// Initial status, `pending` if omitted
    #[serde(default)]
    pub status: Option<String>,
}

/// Update task request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
}

/// List filter
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
}

/// Outcome of reading the `status` query parameter
#[derive(Debug, PartialEq, Eq)]
enum StatusFilter {
    Any,
    Only(TaskStatus),
    /// Unknown value; no task can match
    Nothing,
}

impl StatusFilter {
    fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => StatusFilter::Any,
            Some(value) => value
                .parse()
                .map(StatusFilter::Only)
                .unwrap_or(StatusFilter::Nothing),
        }
    }
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    raw.parse().map_err(|_| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "status".to_string(),
            message: "Status must be 'pending' or 'completed'".to_string(),
        }])
    })
}

/// Create a task
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<TaskCreate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;
    req.validate()?;

    let status = req.status.as_deref().map(parse_status).transpose()?;

    let task = state
        .tasks
        .create(
            user.id,
            NewTask {
                title: req.title,
                description: req.description,
                status,
            },
        )
        .await?;

    Ok(Json(task))
}

/// List the caller's tasks
///
/// `status` is matched case-insensitively. A value that is neither
/// `pending` nor `completed` matches nothing and yields `[]`.
pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(filter) = filter?;

    let tasks = match StatusFilter::from_query(filter.status.as_deref()) {
        StatusFilter::Any => state.tasks.list(user.id, None).await?,
        StatusFilter::Only(status) => state.tasks.list(user.id, Some(status)).await?,
        StatusFilter::Nothing => Vec::new(),
    };

    Ok(Json(tasks))
}

/// Fetch one task
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .get(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// Update title and/or description
///
/// Summary and embedding are recomputed when the description changes.
pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TaskUpdate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    state
        .tasks
        .update(
            user.id,
            id,
            TaskChanges {
                title: req.title,
                description: req.description,
            },
        )
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// Mark a task completed
pub async fn complete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .mark_complete(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// Mark a task pending again
pub async fn uncomplete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .mark_pending(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// Delete a task, returning it as it was before deletion
pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .delete(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}
