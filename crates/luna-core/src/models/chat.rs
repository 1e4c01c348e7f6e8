// ABOUTME: Chat session and message DTOs persisted by the session store
// ABOUTME: Includes the derived duration rule and the user/ai to LLM role mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bot identifier stored when none is configured
pub const DEFAULT_BOT_ID: &str = "luna-namoradeira";

/// Author of a stored chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human user
    User,
    /// The assistant
    Ai,
}

impl Sender {
    /// Role name the generative-language API expects for this sender
    #[must_use]
    pub const fn llm_role(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "model",
        }
    }

    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

/// One message of a conversation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote it
    pub sender: Sender,
    /// Message body
    pub text: String,
    /// When it was written
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// User message stamped with `timestamp`
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp,
        }
    }

    /// Assistant message stamped with `timestamp`
    pub fn ai(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
            timestamp,
        }
    }
}

/// History entry as supplied by a client, timestamps optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who wrote it
    pub sender: Sender,
    /// Message body
    pub text: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            sender: msg.sender,
            text: msg.text.clone(),
        }
    }
}

/// A persisted conversation thread keyed by `session_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Opaque unique key
    pub session_id: String,
    /// Bot persona identifier
    pub bot_id: String,
    /// Set once, on first write
    pub start_time: DateTime<Utc>,
    /// Last activity, recomputed every write
    pub end_time: Option<DateTime<Utc>>,
    /// Ordered, append-only history
    pub messages: Vec<ChatMessage>,
    /// Address of the client that opened the session
    #[serde(rename = "userIP")]
    pub user_ip: String,
    /// Number of stored messages
    pub message_count: i64,
    /// Whole seconds between start and end, when both are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl ChatSession {
    /// Replay the stored messages as client-style history entries
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages.iter().map(HistoryEntry::from).collect()
    }

    /// First message written by the user, if any
    #[must_use]
    pub fn first_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
    }
}

/// Listing row for the session history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session key
    pub session_id: String,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// Last activity
    pub end_time: Option<DateTime<Utc>>,
    /// Number of stored messages
    pub message_count: i64,
    /// First user message, used as a preview
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_user_message: Option<String>,
}

/// Session duration in whole seconds, `None` unless both bounds are set.
///
/// Negative spans (clock skew) clamp to zero.
#[must_use]
pub fn compute_duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (start, end) {
        (Some(start), Some(end)) => Some((end - start).num_seconds().max(0)),
        _ => None,
    }
}
