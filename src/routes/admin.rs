// ABOUTME: Admin routes for the persona instruction and usage statistics
// ABOUTME: Gated by a shared secret in the x-admin-secret header, compared in constant time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::json_body;
use crate::errors::{AppError, ErrorCode};
use crate::resources::ServerResources;
use luna_core::models::SessionSummary;

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

const RECENT_SESSIONS_IN_STATS: i64 = 5;

/// Persona instruction view
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInstructionResponse {
    /// Instruction in effect
    pub instruction: String,
    /// Whether it is the built-in default
    pub is_default: bool,
}

/// Body of `PUT /api/admin/system-instruction`
#[derive(Debug, Deserialize)]
pub struct UpdateSystemInstructionRequest {
    /// New instruction text
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Usage statistics
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Stored sessions
    pub total_sessions: i64,
    /// Stored messages across sessions
    pub total_messages: i64,
    /// Logged connections
    pub total_connections: i64,
    /// A few of the newest sessions
    pub recent_sessions: Vec<SessionSummary>,
}

/// Admin routes handler
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/system-instruction",
                get(Self::get_system_instruction).put(Self::update_system_instruction),
            )
            .route("/api/admin/stats", get(Self::stats))
            .with_state(resources)
    }

    /// Check the shared secret header
    fn authorize(headers: &HeaderMap, resources: &ServerResources) -> Result<(), AppError> {
        let Some(expected) = resources.config.admin_secret.as_deref() else {
            return Err(AppError::new(
                ErrorCode::ServiceUnavailable,
                "Administração desabilitada: ADMIN_SECRET não configurado.",
            ));
        };

        let provided = headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::auth_required("Credencial de administrador ausente."))?;

        if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            warn!("Rejected admin request with wrong secret");
            Err(AppError::new(
                ErrorCode::PermissionDenied,
                "Credencial de administrador inválida.",
            ))
        }
    }

    async fn get_system_instruction(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let (instruction, is_default) = resources.persona_instruction().await?;
        Ok((
            StatusCode::OK,
            Json(SystemInstructionResponse {
                instruction,
                is_default,
            }),
        )
            .into_response())
    }

    async fn update_system_instruction(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        payload: Result<Json<UpdateSystemInstructionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let request = json_body(payload)?;
        let instruction = request
            .instruction
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or_else(|| AppError::missing_field("O campo instruction é obrigatório."))?;

        resources
            .database
            .system_settings()
            .set_persona_instruction(instruction)
            .await?;
        info!(chars = instruction.chars().count(), "Persona instruction updated");

        Ok((
            StatusCode::OK,
            Json(SystemInstructionResponse {
                instruction: instruction.to_owned(),
                is_default: false,
            }),
        )
            .into_response())
    }

    async fn stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let sessions = resources.database.chat_sessions();
        let response = StatsResponse {
            total_sessions: sessions.count_sessions().await?,
            total_messages: sessions.count_messages().await?,
            total_connections: resources.database.access_logs().count().await?,
            recent_sessions: sessions.list_sessions(RECENT_SESSIONS_IN_STATS).await?,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
