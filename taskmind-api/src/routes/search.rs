/// Semantic search endpoint
///
/// # Endpoint
///
/// ```text
/// POST /search
/// Authorization: Bearer <token>
///
/// { "search_term": "milk" }
/// ```
///
/// Returns up to five of the caller's tasks, closest first. Tasks at cosine
/// distance 0.40 or more are left out, so an unrelated term yields `[]`.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use taskmind_shared::{auth::middleware::CurrentUser, models::task::Task};
use validator::Validate;

/// Search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 500, message = "Search term must be 1-500 characters"))]
    pub search_term: String,
}

/// Search the caller's tasks
pub async fn search_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Json(req) = payload?;
    req.validate()?;

    let tasks = state.tasks.search(user.id, &req.search_term).await?;

    Ok(Json(tasks))
}
