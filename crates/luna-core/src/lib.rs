// ABOUTME: Core types crate for the Luna chat server
// ABOUTME: Holds the unified error system and the chat/tool data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

#![deny(unsafe_code)]

//! # Luna Core
//!
//! Canonical definitions shared by the server and its integration tests:
//! - [`errors`]: `AppError`, `ErrorCode`, `AppResult`
//! - [`models`]: chat sessions, messages, tool calls and results

/// Unified error handling
pub mod errors;

/// Chat and tool data models
pub mod models;

pub use errors::{AppError, AppResult, ErrorCode, ErrorResponse};
