// ABOUTME: Key/value settings editable by administrators
// ABOUTME: Holds the global persona instruction override
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};

/// Key under which the persona instruction override is stored
pub const PERSONA_INSTRUCTION_KEY: &str = "system_instruction";

/// System settings database operations manager
pub struct SystemSettingsManager {
    pool: SqlitePool,
}

impl SystemSettingsManager {
    /// Create a new settings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a setting
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar("SELECT value FROM system_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read setting {key}: {e}")))
    }

    /// Insert or replace a setting
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO system_settings (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to write setting {key}: {e}")))?;
        Ok(())
    }

    /// Stored persona instruction override, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn persona_instruction(&self) -> AppResult<Option<String>> {
        Ok(self
            .get(PERSONA_INSTRUCTION_KEY)
            .await?
            .filter(|v| !v.trim().is_empty()))
    }

    /// Replace the persona instruction override
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn set_persona_instruction(&self, instruction: &str) -> AppResult<()> {
        self.set(PERSONA_INSTRUCTION_KEY, instruction).await
    }
}
