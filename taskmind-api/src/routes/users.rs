/// User endpoints
///
/// # Endpoints
///
/// - `POST /users` - Register a new user
/// - `POST /users/login` - Exchange credentials for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, USERNAME_TAKEN},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use taskmind_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Detail returned for any failed login
pub const BAD_CREDENTIALS: &str = "Incorrect username/password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    /// Username
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    /// Password (hashed before storage)
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct UserLogin {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: &'static str,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "username": "benny", "password": "password123" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": "uuid", "username": "benny" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    if User::find_by_username(&state.db, &req.username).await?.is_some() {
        return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
    }

    // Argon2 is CPU-bound; keep it off the async workers
    let plain = req.password;
    let hashed_password = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))??;

    // A concurrent registration can still win the race; the unique
    // constraint turns that into the same 400 via From<sqlx::Error>
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            hashed_password,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(user.into()))
}

/// Login and get a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /users/login
/// Content-Type: application/json
///
/// { "username": "benny", "password": "password123" }
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (same detail)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<UserLogin>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let Some(user) = User::find_by_username(&state.db, &req.username).await? else {
        tracing::debug!(username = %req.username, "Login for unknown username");
        let plain = req.password;
        tokio::task::spawn_blocking(move || password::verify_dummy(&plain))
            .await
            .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?;
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    let plain = req.password;
    let hash = user.hashed_password.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            false
        });

    if !valid {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let access_token = state.signer.issue(user.id, &user.username)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
