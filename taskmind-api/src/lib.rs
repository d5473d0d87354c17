//! # TaskMind API Server Library
//!
//! HTTP surface for TaskMind: user registration and login, owner-scoped task
//! management with AI summaries, and semantic search.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
