// ABOUTME: Data transfer objects shared between the server crate and its tests
// ABOUTME: Chat sessions, messages, and tool call/result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

/// Chat sessions and messages
pub mod chat;
/// Tool calls and results
pub mod tool;

pub use chat::{
    compute_duration, ChatMessage, ChatSession, HistoryEntry, Sender, SessionSummary,
    DEFAULT_BOT_ID,
};
pub use tool::{ToolCall, ToolOutcome, ToolResult};
