// ABOUTME: Chat generation and session history HTTP routes
// ABOUTME: Loads history, runs the turn through the orchestrator, persists the exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{client_ip, json_body, query_params};
use crate::errors::AppError;
use crate::resources::ServerResources;
use luna_core::models::{ChatMessage, HistoryEntry, SessionSummary};

/// Default number of sessions listed
pub const DEFAULT_SESSION_LIST_LIMIT: i64 = 50;
/// Upper bound on the session listing
pub const MAX_SESSION_LIST_LIMIT: i64 = 200;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /api/generate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// User message
    #[serde(default)]
    pub prompt: Option<String>,
    /// Session key chosen by the client
    #[serde(default)]
    pub session_id: Option<String>,
    /// History kept by the client, used when the store has none
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

/// Successful generation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Assistant reply
    pub generated_text: String,
}

/// Query for the session listing
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Maximum sessions returned
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_SESSION_LIST_LIMIT
}

/// Session listing
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    /// Newest first
    pub sessions: Vec<SessionSummary>,
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/generate", post(Self::generate))
            .route("/api/chat/historicos", get(Self::list_sessions))
            .route(
                "/api/chat/historicos/:session_id",
                get(Self::get_session).delete(Self::delete_session),
            )
            .with_state(resources)
    }

    /// Run one chat turn and persist it
    async fn generate(
        State(resources): State<Arc<ServerResources>>,
        peer: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        payload: Result<Json<GenerateRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        let prompt = request
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::missing_field("Mensagem (prompt) é obrigatória"))?
            .to_owned();
        let session_id = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::missing_field("sessionId é obrigatório"))?
            .to_owned();

        debug!(
            session_id = %session_id,
            prompt_prefix = %prompt.chars().take(40).collect::<String>(),
            "Generate request"
        );

        let sessions = resources.database.chat_sessions();
        let stored = sessions.get_session(&session_id).await?;
        let history = match &stored {
            Some(session) if !session.messages.is_empty() => session.history(),
            _ => request.history.unwrap_or_default(),
        };

        let user_message = ChatMessage::user(prompt.clone(), Utc::now());
        let (instruction, _) = resources.persona_instruction().await?;
        let outcome = resources
            .orchestrator
            .run_turn(&prompt, &history, &instruction)
            .await?;
        let ai_message = ChatMessage::ai(outcome.text.clone(), Utc::now());

        let ip = client_ip(&headers, peer.as_ref());
        let session = sessions
            .append_turn(
                &session_id,
                &ip,
                &resources.config.conversation.bot_id,
                user_message,
                ai_message,
            )
            .await?;

        info!(
            session_id = %session_id,
            message_count = session.message_count,
            tool_rounds = outcome.tool_rounds,
            "Chat turn stored"
        );

        Ok((
            StatusCode::OK,
            Json(GenerateResponse {
                generated_text: outcome.text,
            }),
        )
            .into_response())
    }

    /// List recent sessions
    async fn list_sessions(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<ListSessionsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let query = query_params(query)?;
        let limit = query.limit.clamp(1, MAX_SESSION_LIST_LIMIT);
        let sessions = resources
            .database
            .chat_sessions()
            .list_sessions(limit)
            .await?;

        Ok((StatusCode::OK, Json(SessionListResponse { sessions })).into_response())
    }

    /// Full session, or an empty placeholder when the id is unknown
    async fn get_session(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<String>,
    ) -> Result<Response, AppError> {
        let session = resources
            .database
            .chat_sessions()
            .get_session(&session_id)
            .await?;

        let body = match session {
            Some(session) => serde_json::to_value(session)?,
            None => json!({
                "sessionId": session_id,
                "messages": [],
                "messageCount": 0,
            }),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Delete a session
    async fn delete_session(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<String>,
    ) -> Result<Response, AppError> {
        let deleted = resources
            .database
            .chat_sessions()
            .delete_session(&session_id)
            .await?;

        if !deleted {
            return Err(AppError::not_found("Sessão não encontrada"));
        }

        info!(session_id = %session_id, "Session deleted");
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Sessão excluída com sucesso" })),
        )
            .into_response())
    }
}
