// ABOUTME: Standalone utility routes: formatted Sao Paulo datetime and connection logging
// ABOUTME: Neither touches the model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{client_ip, json_body};
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::tools::format_sao_paulo;

/// Body of `GET /api/datetime`
#[derive(Debug, Serialize, Deserialize)]
pub struct DateTimeResponse {
    /// Long pt-BR date and time, minutes precision
    pub datetime: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Body of `POST /api/log-connection`
#[derive(Debug, Deserialize)]
pub struct LogConnectionRequest {
    /// Address reported by the client
    #[serde(default)]
    pub ip: Option<String>,
    /// Action tag
    #[serde(default)]
    pub acao: Option<String>,
}

/// Utility routes handler
pub struct UtilityRoutes;

impl UtilityRoutes {
    /// Create all utility routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/datetime", get(Self::datetime))
            .route("/api/log-connection", post(Self::log_connection))
            .with_state(resources)
    }

    async fn datetime() -> Json<DateTimeResponse> {
        let now = Utc::now();
        Json(DateTimeResponse {
            datetime: format_sao_paulo(now, false),
            timestamp: now.timestamp_millis(),
        })
    }

    async fn log_connection(
        State(resources): State<Arc<ServerResources>>,
        peer: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        payload: Result<Json<LogConnectionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        let action = request
            .acao
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::missing_field("Dados de log incompletos (acao é obrigatória)."))?;
        let ip = request
            .ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map_or_else(|| client_ip(&headers, peer.as_ref()), str::to_owned);

        let id = resources
            .database
            .access_logs()
            .log_connection(&ip, action)
            .await?;
        debug!(id, ip = %ip, action = %action, "Connection logged");

        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Log de conexão registrado." })),
        )
            .into_response())
    }
}
