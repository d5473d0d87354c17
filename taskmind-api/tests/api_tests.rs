/// End-to-end tests for the TaskMind HTTP API
///
/// These run against a real PostgreSQL + pgvector database with the mock AI
/// providers:
/// - Registration and login
/// - Task lifecycle (create → update → complete → delete)
/// - Per-user isolation
/// - Semantic search ranking and limits
///
/// The mock embedder is bag-of-words, so search terms here share words with
/// the tasks they are meant to find.

#[macro_use]
mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde_json::json;
use taskmind_shared::auth::jwt::TokenSigner;
use uuid::Uuid;

#[tokio::test]
async fn test_register_and_login() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    // Duplicate username
    let (status, body) = ctx
        .request(
            Method::POST,
            "/users",
            None,
            Some(json!({ "username": user.username, "password": "another-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already registered");

    // Wrong password
    let (status, body) = ctx
        .request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "username": user.username, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect username/password");

    // Unknown username gets the same answer
    let (status, body) = ctx
        .request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "username": "nobody-here", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect username/password");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_response_has_no_password() {
    let ctx = test_context!();
    let username = format!("quiet-{}", Uuid::new_v4().simple());

    let (status, body) = ctx
        .request(
            Method::POST,
            "/users",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(body["username"], username.as_str());
    assert!(body["id"].is_string());

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&ctx.db)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    let task = ctx
        .create_task(&user, "groceries", "get milk when i get out of work")
        .await;
    let id = task["id"].as_str().unwrap().to_string();

    assert_eq!(task["title"], "groceries");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["summary"], "get milk when i get");
    assert_eq!(task["owner_id"], user.id.to_string());
    assert!(task.get("embedding").is_none());

    // Fetch
    let (status, fetched) = ctx
        .request(Method::GET, &format!("/tasks/{}", id), Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());

    // Title-only update keeps the summary
    let (status, updated) = ctx
        .request(
            Method::PUT,
            &format!("/tasks/{}", id),
            Some(&user.token),
            Some(json!({ "title": "shopping" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "shopping");
    assert_eq!(updated["summary"], "get milk when i get");

    // Description change recomputes the summary
    let (status, updated) = ctx
        .request(
            Method::PUT,
            &format!("/tasks/{}", id),
            Some(&user.token),
            Some(json!({ "description": "buy eggs and bread" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "buy eggs and bread");
    assert_eq!(updated["summary"], "buy eggs and bread");

    // Empty update is a no-op
    let (status, unchanged) = ctx
        .request(
            Method::PUT,
            &format!("/tasks/{}", id),
            Some(&user.token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["updated_at"], updated["updated_at"]);

    // Delete returns the snapshot
    let (status, deleted) = ctx
        .request(Method::DELETE, &format!("/tasks/{}", id), Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id.as_str());
    assert_eq!(deleted["title"], "shopping");

    let (status, body) = ctx
        .request(Method::GET, &format!("/tasks/{}", id), Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");

    let (status, _) = ctx
        .request(Method::DELETE, &format!("/tasks/{}", id), Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_empty_description_summary() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    let task = ctx.create_task(&user, "groceries", "").await;
    assert_eq!(task["summary"], "No description");
    assert_eq!(task["description"], "");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_status_transitions_and_filter() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    let first = ctx.create_task(&user, "walk the dog", "morning walk").await;
    let second = ctx.create_task(&user, "run", "run in the park").await;
    let first_id = first["id"].as_str().unwrap();

    // Completing twice is allowed
    for _ in 0..2 {
        let (status, body) = ctx
            .request(
                Method::PUT,
                &format!("/tasks/{}/complete", first_id),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
    }

    let (status, completed) = ctx
        .request(Method::GET, "/tasks?status=COMPLETED", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], first_id);

    let (_, pending) = ctx
        .request(Method::GET, "/tasks?status=pending", Some(&user.token), None)
        .await;
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], second["id"]);

    let (status, none) = ctx
        .request(Method::GET, "/tasks?status=archived", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(none.as_array().unwrap().is_empty());

    // Back to pending
    let (status, body) = ctx
        .request(
            Method::PUT,
            &format!("/tasks/{}/pending", first_id),
            Some(&user.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (_, all) = ctx
        .request(Method::GET, "/tasks", Some(&user.token), None)
        .await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0]["id"], second["id"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tasks_are_isolated_between_users() {
    let ctx = test_context!();
    let alice = ctx.register_user("alice").await;
    let bob = ctx.register_user("bob").await;

    let task = ctx.create_task(&alice, "milk", "buy milk").await;
    let path = format!("/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = ctx.request(Method::GET, &path, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");

    let (status, _) = ctx
        .request(
            Method::PUT,
            &path,
            Some(&bob.token),
            Some(json!({ "title": "hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(Method::PUT, &format!("{}/complete", path), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.request(Method::DELETE, &path, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs_tasks) = ctx.request(Method::GET, "/tasks", Some(&bob.token), None).await;
    assert!(bobs_tasks.as_array().unwrap().is_empty());

    let (status, hits) = ctx
        .request(
            Method::POST,
            "/search",
            Some(&bob.token),
            Some(json!({ "search_term": "milk" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(hits.as_array().unwrap().is_empty());

    // Alice's task is untouched
    let (status, body) = ctx.request(Method::GET, &path, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "milk");
    assert_eq!(body["status"], "pending");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_search_ranking() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    let partial = ctx.create_task(&user, "milk", "buy milk").await;
    let exact = ctx.create_task(&user, "milk", "milk").await;
    ctx.create_task(&user, "taxes", "file quarterly taxes").await;

    let (status, hits) = ctx
        .request(
            Method::POST,
            "/search",
            Some(&user.token),
            Some(json!({ "search_term": "milk" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["id"], exact["id"]);
    assert_eq!(hits[1]["id"], partial["id"]);

    // Nothing close enough
    let (status, hits) = ctx
        .request(
            Method::POST,
            "/search",
            Some(&user.token),
            Some(json!({ "search_term": "walk the dog" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(hits.as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_search_returns_at_most_five() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    for _ in 0..7 {
        ctx.create_task(&user, "milk", "milk").await;
    }

    let (status, hits) = ctx
        .request(
            Method::POST,
            "/search",
            Some(&user.token),
            Some(json!({ "search_term": "milk" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 5);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_token_for_deleted_user() {
    let ctx = test_context!();

    let signer = TokenSigner::new(
        ctx.config.jwt.secret.clone(),
        Algorithm::HS256,
        Duration::minutes(30),
    );
    let token = signer.issue(Uuid::new_v4(), "ghost").unwrap();

    let (status, body) = ctx.request(Method::GET, "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn test_invalid_task_id() {
    let ctx = test_context!();
    let user = ctx.register_user("benny").await;

    let (status, body) = ctx
        .request(Method::GET, "/tasks/not-a-uuid", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_health_reports_database() {
    let ctx = test_context!();

    let (status, body) = ctx.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["ai"]["embedder"], "mock-hash");
}
