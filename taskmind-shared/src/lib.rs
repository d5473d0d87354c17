//! # TaskMind Shared Library
//!
//! This crate contains the domain types, persistence layer, credential
//! primitives and AI provider integrations used by the TaskMind API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens and bearer-token extraction
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, tasks) with owner-scoped queries
//! - `ai`: Embedding and summarization providers
//! - `tasks`: Task service combining the repository with the AI providers

pub mod ai;
pub mod auth;
pub mod db;
pub mod models;
pub mod tasks;

/// Current version of the TaskMind shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
