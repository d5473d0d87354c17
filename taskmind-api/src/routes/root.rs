/// Liveness endpoint

use axum::Json;
use serde::Serialize;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
}

/// `GET /`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "System Operational",
    })
}
