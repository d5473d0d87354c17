/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `ApiResult<T>`; library errors convert with `?`.
///
/// # Response Body
///
/// ```json
/// { "detail": "Task not found", "error": "not_found" }
/// ```
///
/// Validation failures (422) also carry an `errors` array of
/// `{ "field", "message" }` objects.
///
/// # Example
///
/// ```
/// use taskmind_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Task not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskmind_shared::{
    ai::AiError,
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    models::user::is_username_conflict,
    tasks::TaskError,
};

/// Detail returned when registering a taken username
pub const USERNAME_TAKEN: &str = "Username already registered";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict, reported as 400 (duplicate username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// AI provider failed (502)
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub detail: String,

    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for the 404 returned for missing or foreign tasks
    pub fn task_not_found() -> Self {
        ApiError::NotFound("Task not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, detail, errors) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::UpstreamFailure(msg) => {
                tracing::warn!("AI provider failure: {}", msg);
                (
                    "upstream_failure",
                    "AI provider request failed".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            detail,
            error: error_code.to_string(),
            errors,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if is_username_conflict(&err) {
            return ApiError::Conflict(USERNAME_TAKEN.to_string());
        }
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Not authenticated".to_string()),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => {
                ApiError::Unauthorized(msg)
            }
            AuthError::UnknownUser => ApiError::NotFound("User not found".to_string()),
            AuthError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert token errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            // Signing failures are ours, not the client's
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            other => ApiError::from(AuthError::from(other)),
        }
    }
}

/// Convert AI provider errors to API errors
impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::UpstreamFailure(err.to_string())
    }
}

/// Convert task service errors to API errors
impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Database(e) => ApiError::from(e),
            TaskError::Ai(e) => ApiError::from(e),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

/// Malformed or missing JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "body".to_string(),
                message: e.body_text(),
            }]),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Path segments that do not parse (e.g. a task id that is not a UUID)
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "path".to_string(),
            message: rejection.body_text(),
        }])
    }
}

/// Unparseable query strings
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "query".to_string(),
            message: rejection.body_text(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: String,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Conflict(USERNAME_TAKEN.into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::task_not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UpstreamFailure("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::ValidationError(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let response = ApiError::Unauthorized("Not authenticated".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let json = body_json(response).await;
        assert_eq!(json["detail"], "Not authenticated");
        assert_eq!(json["error"], "unauthorized");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["detail"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let err = ApiError::from(
            Sample {
                password: "short".to_string(),
            }
            .validate()
            .unwrap_err(),
        );
        assert_eq!(err.to_string(), "Validation failed: 1 errors");

        let json = body_json(err.into_response()).await;
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["errors"][0]["field"], "password");
        assert_eq!(
            json["errors"][0]["message"],
            "Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized(ref m) if m == "Not authenticated"
        ));
        assert!(matches!(
            ApiError::from(AuthError::UnknownUser),
            ApiError::NotFound(ref m) if m == "User not found"
        ));
        assert!(matches!(
            ApiError::from(JwtError::Expired),
            ApiError::Unauthorized(ref m) if m == "Token expired"
        ));
    }

    #[test]
    fn test_task_error_mapping() {
        let err = ApiError::from(TaskError::Ai(AiError::Request("timeout".into())));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err = ApiError::from(TaskError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
