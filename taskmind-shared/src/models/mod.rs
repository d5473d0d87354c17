/// Database models for TaskMind
///
/// # Models
///
/// - `user`: User accounts
/// - `task`: Tasks with summaries and embeddings, owner-scoped
///
/// # Example
///
/// ```no_run
/// use taskmind_shared::models::user::{User, CreateUser};
/// use taskmind_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "benny".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod user;
pub mod task;
