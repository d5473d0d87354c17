/// Task model and owner-scoped database operations
///
/// Every query in this module takes the owner's user id and filters on
/// `owner_id`. A task that exists but belongs to someone else is
/// indistinguishable from a task that does not exist.
///
/// # State Machine
///
/// ```text
/// pending ──complete──▶ completed
/// completed ──pending──▶ pending
/// ```
///
/// Both transitions are idempotent: re-applying the current status succeeds.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(16) NOT NULL DEFAULT 'pending',
///     summary TEXT,
///     embedding vector(768) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskmind_shared::models::task::{Task, CreateTask, TaskStatus};
/// use pgvector::Vector;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     owner_id,
///     title: "groceries".to_string(),
///     description: "get milk when i get out of work".to_string(),
///     status: TaskStatus::Pending,
///     summary: Some("Buy milk after work".to_string()),
///     embedding: Vector::from(vec![0.0; 768]),
/// }).await?;
///
/// Task::set_status(&pool, task.id, owner_id, TaskStatus::Completed).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Column list shared by every task query
const TASK_COLUMNS: &str =
    "id, owner_id, title, description, status, summary, embedding, created_at, updated_at";

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet (initial state)
    Pending,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to its stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known task status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    /// Parses a status, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("pending") {
            Ok(TaskStatus::Pending)
        } else if trimmed.eq_ignore_ascii_case("completed") {
            Ok(TaskStatus::Completed)
        } else {
            Err(ParseStatusError(s.to_string()))
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Task model
///
/// The embedding is loaded with the row but never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current status
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// AI-generated short summary of the description
    pub summary: Option<String>,

    /// Embedding of `"{title}: {description}"`
    #[serde(skip_serializing)]
    pub embedding: Vector,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task paired with its cosine distance from a search query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoredTask {
    /// The matching task
    #[sqlx(flatten)]
    pub task: Task,

    /// Cosine distance from the query embedding (0 = identical)
    pub distance: f64,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub owner_id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Initial status
    pub status: TaskStatus,

    /// Summary (computed before insert)
    pub summary: Option<String>,

    /// Embedding (computed before insert)
    pub embedding: Vector,
}

/// Input for updating a task
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New summary
    pub summary: Option<String>,

    /// New embedding
    pub embedding: Option<Vector>,
}

impl UpdateTask {
    /// True if nothing would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.summary.is_none()
            && self.embedding.is_none()
    }
}

impl Task {
    /// Inserts a new task and returns the stored row
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (owner_id, title, description, status, summary, embedding)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.owner_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status.as_str())
            .bind(data.summary)
            .bind(data.embedding)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID, only if owned by `owner_id`
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists an owner's tasks, newest first, optionally restricted to one status
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE owner_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Applies a partial update to an owned task
    ///
    /// Returns `None` if the task does not exist or is not owned by `owner_id`.
    /// An empty update still touches `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.summary.is_some() {
            bind_count += 1;
            query.push_str(&format!(", summary = ${}", bind_count));
        }
        if data.embedding.is_some() {
            bind_count += 1;
            query.push_str(&format!(", embedding = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(summary) = data.summary {
            q = q.bind(summary);
        }
        if let Some(embedding) = data.embedding {
            q = q.bind(embedding);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Sets the status of an owned task
    ///
    /// Setting the status a task already has is allowed and returns the task.
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks
            SET status = $3,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Deletes an owned task and returns the row as it was before deletion
    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Nearest owned tasks by cosine distance
    ///
    /// Only the owner's rows are compared. Rows at or beyond `max_distance`
    /// are dropped; at most `limit` rows are returned, closest first.
    pub async fn search_by_embedding(
        pool: &PgPool,
        owner_id: Uuid,
        query_embedding: &Vector,
        max_distance: f64,
        limit: i64,
    ) -> Result<Vec<ScoredTask>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TASK_COLUMNS}, distance
            FROM (
                SELECT {TASK_COLUMNS}, (embedding <=> $2) AS distance
                FROM tasks
                WHERE owner_id = $1
            ) AS owned
            WHERE distance < $3
            ORDER BY distance ASC
            LIMIT $4
            "#
        );

        let hits = sqlx::query_as::<_, ScoredTask>(&query)
            .bind(owner_id)
            .bind(query_embedding)
            .bind(max_distance)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(hits)
    }

    /// Counts an owner's tasks
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
