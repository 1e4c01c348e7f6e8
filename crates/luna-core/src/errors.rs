// ABOUTME: Unified application error type with stable error codes and HTTP status mapping
// ABOUTME: Every fallible server operation returns AppResult so handlers can map failures uniformly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! Unified error handling
//!
//! `AppError` carries an [`ErrorCode`], a user-facing message and optional
//! technical details. The HTTP layer renders it as `{ "error": ..., "details": ... }`
//! with the status code attached to the error code.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the workspace
pub type AppResult<T> = Result<T, AppError>;

/// Stable error codes for every failure class the server reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request payload failed validation
    InvalidInput,
    /// A required request field was absent
    MissingRequiredField,
    /// Requested record does not exist
    ResourceNotFound,
    /// Credentials were missing
    AuthRequired,
    /// Caller is not allowed to perform the operation
    PermissionDenied,
    /// Upstream model refused the content on safety grounds
    ContentBlocked,
    /// Upstream provider throttled the request
    RateLimited,
    /// Upstream provider (or a disabled feature) is unavailable
    ServiceUnavailable,
    /// Upstream provider rejected our credentials or configuration
    ExternalAuthFailed,
    /// Upstream provider could not be reached or answered garbage
    ExternalServiceError,
    /// The tool-calling loop hit its round cap
    ToolLoopExceeded,
    /// The request exceeded its time budget
    Timeout,
    /// Persistence layer failure
    DatabaseError,
    /// Server misconfiguration
    ConfigError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// HTTP status code associated with this error code
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::ContentBlocked => 400,
            Self::AuthRequired => 401,
            Self::PermissionDenied => 403,
            Self::ResourceNotFound => 404,
            Self::RateLimited => 429,
            Self::ServiceUnavailable => 503,
            Self::Timeout => 504,
            Self::ExternalAuthFailed
            | Self::ExternalServiceError
            | Self::ToolLoopExceeded
            | Self::DatabaseError
            | Self::ConfigError
            | Self::InternalError => 500,
        }
    }

    /// Short machine-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::MissingRequiredField => "Missing required field",
            Self::ResourceNotFound => "Resource not found",
            Self::AuthRequired => "Authentication required",
            Self::PermissionDenied => "Permission denied",
            Self::ContentBlocked => "Content blocked by safety filters",
            Self::RateLimited => "Rate limited by upstream provider",
            Self::ServiceUnavailable => "Service unavailable",
            Self::ExternalAuthFailed => "External service authentication failed",
            Self::ExternalServiceError => "External service error",
            Self::ToolLoopExceeded => "Tool call limit exceeded",
            Self::Timeout => "Request timed out",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Application error with code, user-facing message and optional details
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    /// Error classification
    pub code: ErrorCode,
    /// Message safe to show to end users
    pub message: String,
    /// Technical details for operators (never a stack trace)
    pub details: Option<String>,
}

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach technical details
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Invalid request payload
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Record not found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// A required field was absent or blank
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingRequiredField, message)
    }

    /// No credentials supplied
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Persistence failure. The user sees a generic message; the cause goes to `details`.
    pub fn database(details: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, "Erro ao acessar o banco de dados.")
            .with_details(details)
    }

    /// Upstream service failure
    pub fn external_service(service: &str, details: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("Falha de comunicação com {service}"),
        )
        .with_details(details)
    }

    /// Misconfiguration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

/// Wire shape of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-facing message
    pub error: String,
    /// Optional technical details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("Failed to process JSON data").with_details(err.to_string())
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    use super::{AppError, ErrorResponse};

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorResponse::from(&self))).into_response()
        }
    }
}
