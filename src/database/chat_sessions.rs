// ABOUTME: Session store: one row per session id holding the ordered message list as JSON
// ABOUTME: Turns are written with an upsert; start_time is set once, derived fields every write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::parse_timestamp;
use crate::errors::{AppError, AppResult};
use luna_core::models::{compute_duration, ChatMessage, ChatSession, SessionSummary};

/// Chat session database operations manager
///
/// Concurrent turns on one session id are not coordinated: each write replaces the
/// whole message list, so the last writer wins.
pub struct ChatSessionManager {
    pool: SqlitePool,
}

impl ChatSessionManager {
    /// Create a new session manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a session; `None` when the id was never written
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored document is corrupt.
    pub async fn get_session(&self, session_id: &str) -> AppResult<Option<ChatSession>> {
        let row = sqlx::query(
            r"
            SELECT session_id, bot_id, start_time, end_time, user_ip, messages, message_count, duration_secs
            FROM chat_sessions
            WHERE session_id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    /// Append one user/ai exchange and upsert the session
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the row fails.
    pub async fn append_turn(
        &self,
        session_id: &str,
        user_ip: &str,
        bot_id: &str,
        user_message: ChatMessage,
        ai_message: ChatMessage,
    ) -> AppResult<ChatSession> {
        let existing = self.get_session(session_id).await?;
        let now = Utc::now();

        let mut session = existing.unwrap_or_else(|| ChatSession {
            session_id: session_id.to_owned(),
            bot_id: bot_id.to_owned(),
            start_time: user_message.timestamp,
            end_time: None,
            messages: Vec::new(),
            user_ip: user_ip.to_owned(),
            message_count: 0,
            duration: None,
        });

        session.messages.push(user_message);
        session.messages.push(ai_message);
        session.end_time = Some(now);
        session.message_count = i64::try_from(session.messages.len())
            .map_err(|_| AppError::internal("Session message count overflow"))?;
        session.duration = compute_duration(Some(session.start_time), session.end_time);

        let messages_json = serde_json::to_string(&session.messages)?;
        let start = session.start_time.to_rfc3339();
        let end = now.to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO chat_sessions (session_id, bot_id, start_time, end_time, user_ip, messages, message_count, duration_secs, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $4, $4)
            ON CONFLICT(session_id) DO UPDATE SET
                end_time = excluded.end_time,
                messages = excluded.messages,
                message_count = excluded.message_count,
                duration_secs = excluded.duration_secs,
                updated_at = excluded.updated_at
            ",
        )
        .bind(session_id)
        .bind(bot_id)
        .bind(&start)
        .bind(&end)
        .bind(user_ip)
        .bind(&messages_json)
        .bind(session.message_count)
        .bind(session.duration)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save session: {e}")))?;

        debug!(
            session_id = %session_id,
            message_count = session.message_count,
            "Session saved"
        );
        Ok(session)
    }

    /// Most recent sessions first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_sessions(&self, limit: i64) -> AppResult<Vec<SessionSummary>> {
        let rows = sqlx::query(
            r"
            SELECT session_id, start_time, end_time, message_count,
                   (SELECT json_extract(m.value, '$.text')
                    FROM json_each(chat_sessions.messages) AS m
                    WHERE json_extract(m.value, '$.sender') = 'user'
                    ORDER BY m.key
                    LIMIT 1) AS first_user_message
            FROM chat_sessions
            ORDER BY start_time DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        rows.iter()
            .map(|r| {
                let end_time: Option<String> = r.get("end_time");
                Ok(SessionSummary {
                    session_id: r.get("session_id"),
                    start_time: parse_timestamp(&r.get::<String, _>("start_time"))?,
                    end_time: end_time.as_deref().map(parse_timestamp).transpose()?,
                    message_count: r.get("message_count"),
                    first_user_message: r.get("first_user_message"),
                })
            })
            .collect()
    }

    /// Remove a session; `false` when it did not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn delete_session(&self, session_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of stored sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_sessions(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM chat_sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count sessions: {e}")))
    }

    /// Number of stored messages across all sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_messages(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COALESCE(SUM(message_count), 0) FROM chat_sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count messages: {e}")))
    }
}

fn row_to_session(row: &SqliteRow) -> AppResult<ChatSession> {
    let messages_json: String = row.get("messages");
    let messages: Vec<ChatMessage> = serde_json::from_str(&messages_json)
        .map_err(|e| AppError::database(format!("Corrupt session messages: {e}")))?;
    let start_time = parse_timestamp(&row.get::<String, _>("start_time"))?;
    let end_time = row
        .get::<Option<String>, _>("end_time")
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    Ok(ChatSession {
        session_id: row.get("session_id"),
        bot_id: row.get("bot_id"),
        start_time,
        end_time,
        messages,
        user_ip: row.get("user_ip"),
        message_count: row.get("message_count"),
        duration: compute_duration(Some(start_time), end_time),
    })
}
