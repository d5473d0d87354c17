#![allow(dead_code)]

//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Test database setup (migrations) and cleanup
//! - Router with mock AI providers
//! - User registration/login helpers
//! - JSON request helper
//!
//! Tests need a PostgreSQL database with the `vector` extension available,
//! named by `DATABASE_URL`. Without it they print a note and pass.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Mutex;
use taskmind_api::app::{build_router, AppState};
use taskmind_api::config::{cors_origins, AiConfig, AiMode, ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskmind_shared::ai::AiProviders;
use taskmind_shared::db::migrations::run_migrations;
use tower::ServiceExt;
use uuid::Uuid;

/// Returns a ready context, or skips the calling test when no database is configured
macro_rules! test_context {
    () => {
        match common::TestContext::new().await.expect("test context") {
            Some(ctx) => ctx,
            None => {
                eprintln!("DATABASE_URL not set; skipping database test");
                return;
            }
        }
    };
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    created_users: Mutex<Vec<Uuid>>,
}

/// A registered user with a valid token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub token: String,
}

fn test_config(database_url: String) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: cors_origins(None),
            production: false,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-key-32-bytes-min".to_string(),
            algorithm: Algorithm::HS256,
            expire_minutes: 30,
        },
        ai: AiConfig {
            mode: AiMode::Mock,
            groq_api_key: None,
            groq_model: "unused".to_string(),
            gemini_api_key: None,
            gemini_model: "unused".to_string(),
        },
    }
}

impl TestContext {
    /// Creates a new test context, or `None` if `DATABASE_URL` is unset
    pub async fn new() -> anyhow::Result<Option<Self>> {
        dotenvy::dotenv().ok();

        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let config = test_config(database_url);

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone(), AiProviders::mock());
        let app = build_router(state);

        Ok(Some(TestContext {
            db,
            app,
            config,
            created_users: Mutex::new(Vec::new()),
        }))
    }

    /// Sends a request and returns the status and JSON body (`Null` if empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    /// Registers a fresh user and logs in
    pub async fn register_user(&self, prefix: &str) -> TestUser {
        let username = format!("{}-{}", prefix, Uuid::new_v4().simple());
        let password = "password123".to_string();

        let (status, body) = self
            .request(
                Method::POST,
                "/users",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
        self.created_users.lock().unwrap().push(id);

        let (status, body) = self
            .request(
                Method::POST,
                "/users/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        TestUser {
            id,
            username,
            password,
            token: body["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task for `user` through the API and returns the body
    pub async fn create_task(&self, user: &TestUser, title: &str, description: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/tasks",
                Some(&user.token),
                Some(json!({ "title": title, "description": description })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
        body
    }

    /// Deletes every user registered through this context (tasks cascade)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let ids: Vec<Uuid> = self.created_users.lock().unwrap().drain(..).collect();
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
