// ABOUTME: Append-only log of client connections keyed by IP and action tag
// ABOUTME: Feeds the admin statistics endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};

/// Access log database operations manager
pub struct AccessLogManager {
    pool: SqlitePool,
}

impl AccessLogManager {
    /// Create a new access log manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a connection, returning the new row id
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn log_connection(&self, ip: &str, action: &str) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO access_logs (ip, action, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(ip)
        .bind(action)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log connection: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Number of logged connections
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM access_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count connections: {e}")))
    }
}
