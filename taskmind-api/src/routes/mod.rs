/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `root`: Liveness message
/// - `health`: Readiness check with database status
/// - `users`: Registration and login
/// - `tasks`: Owner-scoped task CRUD and status transitions
/// - `search`: Semantic search over the caller's tasks

pub mod health;
pub mod root;
pub mod search;
pub mod tasks;
pub mod users;
