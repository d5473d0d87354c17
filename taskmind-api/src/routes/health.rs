/// Health check endpoint
///
/// Verifies the server is running and the database answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 },
///   "ai": { "embedder": "gemini", "summarizer": "groq" }
/// }
/// ```
///
/// A failed database check reports `"degraded"` / `"disconnected"` with 200;
/// the endpoint itself never fails.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use taskmind_shared::db::pool::{get_pool_stats, health_check as db_health_check, PoolStats};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// Database status
    pub database: &'static str,

    /// Connection pool statistics
    pub pool: PoolStats,

    /// Configured AI providers
    pub ai: AiStatus,
}

/// Names of the configured AI providers
#[derive(Debug, Serialize)]
pub struct AiStatus {
    pub embedder: String,
    pub summarizer: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let ai = state.tasks.ai();

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: get_pool_stats(&state.db),
        ai: AiStatus {
            embedder: ai.embedder_name().to_string(),
            summarizer: ai.summarizer_name().to_string(),
        },
    })
}
