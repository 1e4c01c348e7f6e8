// ABOUTME: Main library entry point for the Luna persona chat backend
// ABOUTME: Gemini tool-calling conversations, weather and datetime tools, persisted chat sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

#![deny(unsafe_code)]

//! # Luna Chat Server
//!
//! Backend for "Luna", a persona-based chat assistant. A turn takes the user's prompt
//! and the session history, sends them to a hosted generative-language model, lets the
//! model call local tools (current São Paulo date/time, city weather), persists the
//! exchange and returns the reply.
//!
//! ## Architecture
//!
//! - **LLM**: provider trait and the Gemini `generateContent` client
//! - **Tools**: tool registry and dispatcher; failures stay in-band
//! - **Conversation**: the bounded tool-calling loop for one turn
//! - **Database**: `SQLite` session store, settings and access logs
//! - **Routes**: axum routers for generate, history, utility, admin and health
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use luna_chat_server::config::ServerConfig;
//! use luna_chat_server::errors::AppResult;
//! use luna_chat_server::resources::ServerResources;
//! use luna_chat_server::server::LunaServer;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let port = config.http_port;
//!     let resources = ServerResources::from_config(config).await?;
//!     LunaServer::new(Arc::new(resources)).run(port).await
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Tool-calling conversation orchestrator
pub mod conversation;

/// `SQLite` persistence
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External API clients (weather)
pub mod external;

/// LLM provider abstraction and Gemini client
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// Shared service objects
pub mod resources;

/// `HTTP` routes
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Tools callable by the model
pub mod tools;

pub use luna_core::models;
