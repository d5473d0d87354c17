/// Task service: owner-scoped task operations with AI enrichment
///
/// Every write that sets a description also sets the summary and the
/// embedding. Both are computed before the row is touched, so a provider
/// failure leaves the database unchanged.
///
/// # Example
///
/// ```no_run
/// use taskmind_shared::ai::AiProviders;
/// use taskmind_shared::tasks::{NewTask, TaskService};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), taskmind_shared::tasks::TaskError> {
/// let service = TaskService::new(pool, AiProviders::mock());
///
/// service.create(owner_id, NewTask {
///     title: "groceries".to_string(),
///     description: "get milk when i get out of work".to_string(),
///     status: None,
/// }).await?;
///
/// let hits = service.search(owner_id, "milk").await?;
/// # Ok(())
/// # }
/// ```

use crate::ai::{AiError, AiProviders};
use crate::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use pgvector::Vector;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Cosine distance at or above which a task is not a search match
pub const SEARCH_DISTANCE_THRESHOLD: f64 = 0.40;

/// Maximum number of search results
pub const SEARCH_RESULT_LIMIT: i64 = 5;

/// Task service errors
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Summary or embedding provider failed
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// Fields for a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Defaults to pending
    pub status: Option<TaskStatus>,
}

/// Replacement fields for an existing task
///
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Text that represents a task in embedding space
pub fn embedding_text(title: &str, description: &str) -> String {
    format!("{}: {}", title, description)
}

/// Owner-scoped task operations
#[derive(Debug, Clone)]
pub struct TaskService {
    pool: PgPool,
    ai: AiProviders,
}

impl TaskService {
    pub fn new(pool: PgPool, ai: AiProviders) -> Self {
        Self { pool, ai }
    }

    /// The providers used for enrichment
    pub fn ai(&self) -> &AiProviders {
        &self.ai
    }

    async fn enrich(&self, title: &str, description: &str) -> Result<(String, Vector), AiError> {
        let summary = self.ai.summarize(description).await?;
        let embedding = self.ai.embed(&embedding_text(title, description)).await?;
        Ok((summary, Vector::from(embedding)))
    }

    /// Creates a task owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, new_task: NewTask) -> Result<Task, TaskError> {
        let (summary, embedding) = self.enrich(&new_task.title, &new_task.description).await?;

        let task = Task::create(
            &self.pool,
            CreateTask {
                owner_id,
                title: new_task.title,
                description: new_task.description,
                status: new_task.status.unwrap_or_default(),
                summary: Some(summary),
                embedding,
            },
        )
        .await?;

        info!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Lists the owner's tasks, newest first
    pub async fn list(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, TaskError> {
        Ok(Task::list_by_owner(&self.pool, owner_id, status).await?)
    }

    /// Fetches one of the owner's tasks
    pub async fn get(&self, owner_id: Uuid, task_id: Uuid) -> Result<Option<Task>, TaskError> {
        Ok(Task::find_by_id_and_owner(&self.pool, task_id, owner_id).await?)
    }

    /// Updates title and/or description
    ///
    /// Summary and embedding are recomputed only when the description
    /// actually changes. A title-only change keeps the stored embedding.
    /// If nothing would change, the stored task is returned untouched.
    pub async fn update(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, TaskError> {
        let Some(current) = Task::find_by_id_and_owner(&self.pool, task_id, owner_id).await? else {
            return Ok(None);
        };

        let mut update = UpdateTask {
            title: changes.title,
            ..Default::default()
        };

        if let Some(description) = changes.description {
            if description != current.description {
                let title = update.title.as_deref().unwrap_or(&current.title);
                let (summary, embedding) = self.enrich(title, &description).await?;
                debug!(task_id = %task_id, "Description changed, summary and embedding recomputed");

                update.summary = Some(summary);
                update.embedding = Some(embedding);
                update.description = Some(description);
            }
        }

        if update.is_empty() {
            return Ok(Some(current));
        }

        Ok(Task::update(&self.pool, task_id, owner_id, update).await?)
    }

    /// Marks a task completed (idempotent)
    pub async fn mark_complete(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, TaskError> {
        Ok(Task::set_status(&self.pool, task_id, owner_id, TaskStatus::Completed).await?)
    }

    /// Marks a task pending again (idempotent)
    pub async fn mark_pending(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, TaskError> {
        Ok(Task::set_status(&self.pool, task_id, owner_id, TaskStatus::Pending).await?)
    }

    /// Deletes a task, returning it as it was
    pub async fn delete(&self, owner_id: Uuid, task_id: Uuid) -> Result<Option<Task>, TaskError> {
        let deleted = Task::delete(&self.pool, task_id, owner_id).await?;
        if deleted.is_some() {
            info!(task_id = %task_id, owner_id = %owner_id, "Task deleted");
        }
        Ok(deleted)
    }

    /// Semantic search over the owner's tasks
    ///
    /// Returns at most [`SEARCH_RESULT_LIMIT`] tasks with cosine distance
    /// strictly below [`SEARCH_DISTANCE_THRESHOLD`], closest first.
    pub async fn search(&self, owner_id: Uuid, term: &str) -> Result<Vec<Task>, TaskError> {
        let query_embedding = Vector::from(self.ai.embed(term).await?);

        let hits = Task::search_by_embedding(
            &self.pool,
            owner_id,
            &query_embedding,
            SEARCH_DISTANCE_THRESHOLD,
            SEARCH_RESULT_LIMIT,
        )
        .await?;

        debug!(
            owner_id = %owner_id,
            hits = hits.len(),
            best_distance = hits.first().map(|h| h.distance),
            "Search completed"
        );

        Ok(hits.into_iter().map(|hit| hit.task).collect())
    }
}
