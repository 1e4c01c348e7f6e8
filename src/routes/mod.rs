// ABOUTME: Route module organization for the Luna HTTP endpoints
// ABOUTME: One router per domain, merged by the server module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! Route module for the Luna chat server
//!
//! Each domain module contains only route definitions and thin handler functions
//! that delegate to the orchestrator and the database managers.

/// Admin routes gated by the shared secret header
pub mod admin;
/// Generate and session history routes
pub mod chat;
/// Health check route
pub mod health;
/// Date/time and connection log routes
pub mod utility;

pub use admin::AdminRoutes;
pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use utility::UtilityRoutes;

use std::net::SocketAddr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Query};
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::{AppError, AppResult};

/// Unwrap a JSON body, turning extractor rejections into `{ error, details }` responses
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AppError::invalid_input("Corpo da requisição inválido.").with_details(rejection.body_text())
    })
}

/// Same as [`json_body`] for query strings
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query.map(|Query(params)| params).map_err(|rejection| {
        AppError::invalid_input("Parâmetros de consulta inválidos.")
            .with_details(rejection.body_text())
    })
}

/// Best-effort client address: first `X-Forwarded-For` hop, then the socket peer
pub(crate) fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}
