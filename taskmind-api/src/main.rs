//! # TaskMind API Server
//!
//! Task management backend with per-user isolation, AI summaries of task
//! descriptions and semantic search over task embeddings.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect to PostgreSQL and run migrations (enables `vector`)
//! 3. Build the AI providers (Groq + Gemini, or mocks)
//! 4. Serve until Ctrl-C / SIGTERM, then close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskmind-api
//! ```

use std::sync::Arc;
use taskmind_api::{
    app::{build_router, AppState},
    config::{AiConfig, AiMode, Config},
};
use taskmind_shared::{
    ai::{self, AiProviders, GeminiEmbeddingProvider, GroqSummaryProvider},
    db::{
        migrations::{get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskmind_api=debug,taskmind_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskMind API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;
    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        up_to_date = status.is_up_to_date,
        "Database schema ready"
    );

    let providers = build_providers(&config.ai)?;
    tracing::info!(
        embedder = providers.embedder_name(),
        summarizer = providers.summarizer_name(),
        "AI providers configured"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, providers);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

fn build_providers(config: &AiConfig) -> anyhow::Result<AiProviders> {
    match config.mode {
        AiMode::Mock => {
            tracing::warn!("Using mock AI providers; summaries and search are not semantic");
            Ok(AiProviders::mock())
        }
        AiMode::Remote => {
            let client = ai::http_client()?;

            let embedder = GeminiEmbeddingProvider::new(
                client.clone(),
                config.gemini_api_key.clone().unwrap_or_default(),
                Some(config.gemini_model.clone()),
            )?;
            let summarizer = GroqSummaryProvider::new(
                client,
                config.groq_api_key.clone().unwrap_or_default(),
                Some(config.groq_model.clone()),
            )?;

            Ok(AiProviders::new(Arc::new(embedder), Arc::new(summarizer)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
