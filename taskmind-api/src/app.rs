/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskmind_api::{app::AppState, config::Config};
/// use taskmind_shared::ai::AiProviders;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, AiProviders::mock());
/// let app = taskmind_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, MAX_TOKEN_LIFETIME_MINUTES},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskmind_shared::{
    ai::AiProviders,
    auth::{jwt::TokenSigner, middleware::authenticate},
    tasks::TaskService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token signer built from the configuration
    pub signer: TokenSigner,

    /// Task operations with AI enrichment
    pub tasks: TaskService,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, ai: AiProviders) -> Self {
        let signer = TokenSigner::new(
            config.jwt.secret.clone(),
            config.jwt.algorithm,
            Duration::minutes(config.jwt.expire_minutes.clamp(1, MAX_TOKEN_LIFETIME_MINUTES)),
        );

        Self {
            tasks: TaskService::new(db.clone(), ai),
            db,
            config: Arc::new(config),
            signer,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // FRONTEND_URL=*: any origin, no credentials
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                        # Liveness (public)
/// ├── GET  /health                  # Readiness (public)
/// ├── POST /users                   # Register (public)
/// ├── POST /users/login             # Login (public)
/// ├── /tasks                        # Bearer token required
/// │   ├── GET    /                  # List (?status=)
/// │   ├── POST   /                  # Create
/// │   ├── GET    /:id               # Fetch
/// │   ├── PUT    /:id               # Update
/// │   ├── DELETE /:id               # Delete
/// │   ├── PUT    /:id/complete      # Mark completed
/// │   └── PUT    /:id/pending       # Mark pending
/// └── POST /search                  # Semantic search, bearer token required
/// ```
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. Authentication (task and search routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::root::root))
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::register))
        .route("/users/login", post(routes::users::login));

    let protected_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/complete", put(routes::tasks::complete_task))
        .route("/tasks/:id/pending", put(routes::tasks::uncomplete_task))
        .route("/search", post(routes::search::search_tasks))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Validates the token, loads the user and injects `CurrentUser` into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, &state.signer, req.headers()).await?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
